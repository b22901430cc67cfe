//! Even splitting of retrieved records into digest chunks.

/// Split `items` into exactly `parts` contiguous slices.
///
/// The first `parts - 1` slices hold `len / parts` items each and the last slice takes the
/// remainder, so 10 items over 3 parts give `[3, 3, 4]` and 2 items give `[0, 0, 2]`. Zero parts
/// yield no slices.
pub fn partition<T>(items: &[T], parts: usize) -> Vec<&[T]> {
    if parts == 0 {
        return Vec::new();
    }
    let size = items.len() / parts;
    let mut slices: Vec<&[T]> = (0..parts - 1)
        .map(|index| &items[index * size..(index + 1) * size])
        .collect();
    slices.push(&items[(parts - 1) * size..]);
    slices
}
