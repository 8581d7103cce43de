use super::types::Section;

/// Order sections by descending score and keep the best `max_sections`.
///
/// The sort is stable, so equal scores keep document order.
pub(crate) fn rank_sections(sections: &mut Vec<Section<'_>>, max_sections: usize) {
    sections.sort_by(|a, b| b.score.total_cmp(&a.score));
    sections.truncate(max_sections);
}
