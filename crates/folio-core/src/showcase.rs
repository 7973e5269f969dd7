//! Showcase terminal — project sections whose commands type out once when
//! they first scroll into view, followed by their project info.

use crate::types::ProjectSection;

#[derive(Debug, Clone)]
pub struct SectionState {
    pub section: ProjectSection,
    pub animated: bool,
    pub info_visible: bool,
}

#[derive(Debug, Clone, Default)]
pub struct Showcase {
    sections: Vec<SectionState>,
}

impl Showcase {
    /// The first project's info is visible from the start.
    pub fn new(projects: Vec<ProjectSection>) -> Self {
        let sections = projects
            .into_iter()
            .enumerate()
            .map(|(i, section)| SectionState {
                section,
                animated: false,
                info_visible: i == 0,
            })
            .collect();
        Self { sections }
    }

    pub fn sections(&self) -> &[SectionState] {
        &self.sections
    }

    pub fn get(&self, index: usize) -> Option<&SectionState> {
        self.sections.get(index)
    }

    /// Record that a section came into view. Returns true only the first
    /// time, when its command should start typing.
    pub fn mark_visible(&mut self, index: usize) -> bool {
        match self.sections.get_mut(index) {
            Some(s) if !s.animated => {
                s.animated = true;
                true
            }
            _ => false,
        }
    }

    /// Returns true if the info was not already visible.
    pub fn show_info(&mut self, index: usize) -> bool {
        match self.sections.get_mut(index) {
            Some(s) if !s.info_visible => {
                s.info_visible = true;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge::KnowledgeBase;

    #[test]
    fn test_first_info_visible_initially() {
        let showcase = Showcase::new(KnowledgeBase::builtin().projects);
        assert!(showcase.get(0).unwrap().info_visible);
        assert!(!showcase.get(1).unwrap().info_visible);
        assert!(showcase.sections().iter().all(|s| !s.animated));
    }

    #[test]
    fn test_mark_visible_once() {
        let mut showcase = Showcase::new(KnowledgeBase::builtin().projects);
        assert!(showcase.mark_visible(1));
        assert!(!showcase.mark_visible(1));
        assert!(!showcase.mark_visible(99));
    }

    #[test]
    fn test_show_info_once() {
        let mut showcase = Showcase::new(KnowledgeBase::builtin().projects);
        assert!(!showcase.show_info(0));
        assert!(showcase.show_info(2));
        assert!(!showcase.show_info(2));
    }
}
