//! Questionnaire phrasings the review aggregator has used over time, one catalog per content
//! section. Order matters: earlier phrasings win when two match at the same position.

use std::sync::LazyLock;

use super::qa::QuestionSet;

pub const BACKGROUND_QUESTIONS: &[&str] = &[
    r"Please describe your company and your position there.",
    r"Introduce your business and what you do there.",
    r"Please describe your company and position.",
    r"Please briefly describe what your company does.",
    r"Please describe your organization.",
    r"Describe what your company does in a single sentence.",
];

pub const SOLUTION_QUESTIONS: &[&str] = &[
    r"How did you select * and what were the deciding factors?",
    r"Describe the scope of work in detail, including the project steps, key deliverables, and technologies used.",
    r"What was the scope of their involvement?",
    r"How did you find *?",
    r"How did you select *?",
    r"How did you select this *?",
    r"How did you come to work with *?",
    r"How many people from *'s team worked with you, and what were their positions?",
    r"What is the team composition?",
    r"What was the team composition?",
    r"How much have you invested with them?",
    r"What is the status of this engagement?",
    r"Why did you select *?",
    r"Could you provide a sense of the size of this initiative in financial terms?",
    r"How many teammates from *?",
    r"Describe the scope of work in detail. Please include a summary of key deliverables.",
    r"How many resources from *?",
    r"Describe the project and the services they provided in detail.",
    r"Please describe the scope of their work.",
    r"What was your process in selecting *?",
    r"Can you provide a ballpark figure for the size of the work that *?",
    r"What's the status of this engagement?",
];

pub const CHALLENGE_QUESTIONS: &[&str] = &[
    r"For what projects/services did your company hire *, and what were your goals?",
    r"What specific goals or objectives did you hire *?",
    r"What challenge were you trying to address with *?",
    r"For what projects/services did your company hire *?",
    r"What was the business challenge that you were trying to address when you approached *?",
    r"What business challenge were you trying to address with *?",
    r"What was your goal in working with *?",
    r"What were your goals for this project?",
    r"What specific goals or objectives did you hire *",
    r"What specific goals or objectives did you hire * to accomplish?",
    r"What challenge were you addressing when you hired *?",
];

pub const FEEDBACK_QUESTIONS: &[&str] = &[
    r"What evidence can you share that demonstrates the impact of the engagement?",
    r"Are there any areas they could improve?",
    r"What did you find most impressive about them?",
    r"Can you share any outcomes from the project that demonstrate progress or success?",
    r"How effective was the workflow between your team and theirs?",
    r"What did you find most impressive or unique about this company?",
    r"Can you share any information that demonstrates the impact that this project has had on your business?",
    r"Could you share any evidence that would demonstrate the productivity, quality of work, or the impact of the engagement?",
    r"Can you share any measurable outcomes of the project or general feedback about the deliverables?",
    r"Describe their project management style, including communication tools and timeliness.",
    r"Are there any areas for improvement or something they could have done differently?",
    r"What were the measurable outcomes from the project that demonstrate progress or success?",
    r"Did they deliver items on time?",
    r"How did they respond to your needs?",
    r"What was your primary form of communication with *?",
    r"How satisfied are you with the work of *?",
    r"Is there anything unique about *?",
    r"Looking back on the work so far, is there any area that you think they could improve upon or something that you might do differently?",
    r"What advice would you give a future client of theirs?",
    r"Describe their project management",
    r"How was project management arranged and how effective was it\?",
    r"What stood out to you about their communication or project delivery\?",
    r"What made you happiest working with \*?",
    r"What aspect of their performance did you appreciate the most\?",
    r"What impressed you most about \*?",
    r"What improvements would you suggest for \*?",
    r"What’s one thing \* could do better\?",
    r"What has been the greatest result of the work done by \*?",
    r"What has your experience been like collaborating with the team at \*?",
    r"Do you have any advice for potential customers?",
    r"What kind of impact did this project have on your company?",
    r"What could have been done differently on this project?",
    r"What sets \* apart from other vendors you’ve worked with?",
    r"Are there any areas for improvement",
    r"Do you have any advice for potential customers\?",
    r"How was project management arranged and how effective was it\?",
    r"How did your relationship with your partner evolve\?",
    r"What advice do you have for clients with similar needs to yours\?",
    r"In what ways can they improve\?",
];

static BACKGROUND: LazyLock<QuestionSet> = LazyLock::new(|| compile(BACKGROUND_QUESTIONS));
static SOLUTION: LazyLock<QuestionSet> = LazyLock::new(|| compile(SOLUTION_QUESTIONS));
static CHALLENGE: LazyLock<QuestionSet> = LazyLock::new(|| compile(CHALLENGE_QUESTIONS));
static FEEDBACK: LazyLock<QuestionSet> = LazyLock::new(|| compile(FEEDBACK_QUESTIONS));

fn compile(patterns: &[&str]) -> QuestionSet {
    QuestionSet::new(patterns).expect("built-in question catalog compiles")
}

/// Compiled catalog for the background section.
pub fn background() -> &'static QuestionSet {
    &BACKGROUND
}

/// Compiled catalog for the solution section.
pub fn solution() -> &'static QuestionSet {
    &SOLUTION
}

/// Compiled catalog for the opportunity/challenge section.
pub fn challenge() -> &'static QuestionSet {
    &CHALLENGE
}

/// Compiled catalog for the results/feedback section.
pub fn feedback() -> &'static QuestionSet {
    &FEEDBACK
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_catalog_compiles() {
        for patterns in [
            BACKGROUND_QUESTIONS,
            SOLUTION_QUESTIONS,
            CHALLENGE_QUESTIONS,
            FEEDBACK_QUESTIONS,
        ] {
            assert!(QuestionSet::new(patterns).is_ok());
        }
    }

    #[test]
    fn background_catalog_extracts_company_description() {
        let text = "Please describe your company and your position there. I'm the CTO of a \
                    logistics startup. Describe what your company does in a single sentence. \
                    We move freight.";
        assert_eq!(
            background().extract(text),
            "Q: Please describe your company and your position there.\n\
             A: I'm the CTO of a logistics startup.\n\n\
             Q: Describe what your company does in a single sentence.\n\
             A: We move freight."
        );
    }

    #[test]
    fn feedback_catalog_strips_vendor_name_from_answer() {
        let text = "What impressed you most about *? Their speed. Do you have any advice for \
                    potential customers? Be specific.";
        let pairs = feedback().pairs(text);
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].question, "What impressed you most about *?");
        assert_eq!(pairs[0].answer.as_deref(), Some("Their speed."));
        assert_eq!(pairs[1].answer.as_deref(), Some("Be specific."));
    }
}
