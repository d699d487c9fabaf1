/// Stack of open element names.
///
/// Popping is tolerant of mismatched nesting: `pop` removes the topmost
/// matching name together with everything opened after it, and does nothing
/// when the name is not open.
#[derive(Debug, Default, Clone)]
pub struct ElementStack {
    elements: Vec<String>,
}

impl ElementStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, tag_name: impl Into<String>) {
        self.elements.push(tag_name.into());
    }

    pub fn pop(&mut self, tag_name: &str) {
        if let Some(index) = self.elements.iter().rposition(|name| name == tag_name) {
            self.elements.truncate(index);
        }
    }

    pub fn has_with_tag_name(&self, tag_name: &str) -> bool {
        self.elements.iter().any(|name| name == tag_name)
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn clear(&mut self) {
        self.elements.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pop_unwinds_everything_above() {
        let mut stack = ElementStack::new();
        stack.push("ul");
        stack.push("li");
        stack.push("b");
        stack.pop("li");
        assert_eq!(stack.len(), 1);
        assert!(stack.has_with_tag_name("ul"));
        assert!(!stack.has_with_tag_name("b"));
    }

    #[test]
    fn test_pop_takes_topmost_match() {
        let mut stack = ElementStack::new();
        stack.push("div");
        stack.push("div");
        stack.pop("div");
        assert_eq!(stack.len(), 1);
    }

    #[test]
    fn test_pop_missing_is_noop() {
        let mut stack = ElementStack::new();
        stack.push("span");
        stack.pop("p");
        assert_eq!(stack.len(), 1);
        stack.clear();
        assert!(stack.is_empty());
    }
}
