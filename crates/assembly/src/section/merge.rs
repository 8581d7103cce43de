use super::types::Section;

/// Fold each chunk into its predecessor when the two are contiguous in the source.
///
/// A merged chunk is compared against its new neighbour before moving on, so a run
/// of touching chunks collapses into one. Chunks separated by a gap stay apart.
pub(crate) fn merge_adjacent(section: &mut Section<'_>) {
    let mut i = 0;
    while i + 1 < section.chunks.len() {
        if !section.chunks[i].is_followed_by(&section.chunks[i + 1]) {
            i += 1;
            continue;
        }
        let next = section.chunks.remove(i + 1);
        let chunk = &mut section.chunks[i];
        chunk.text.to_mut().push_str(&next.text);
        chunk.end_pos = next.end_pos;
        chunk.token_count += next.token_count;
    }
}
