#![forbid(unsafe_code)]

//! Drill-down navigation through nested commands.

use super::command::Command;

/// One entered branch and the children it lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageFrame {
    /// The branch that was entered.
    pub branch: Command,
    /// Its children, captured on entry.
    pub children: Vec<Command>,
}

/// Navigation stack over a command tree. Empty means the root level.
#[derive(Debug, Clone, Default)]
pub struct PageStack {
    root: Vec<Command>,
    frames: Vec<PageFrame>,
}

impl PageStack {
    /// A stack at the root of `root`.
    pub fn new(root: Vec<Command>) -> Self {
        Self {
            root,
            frames: Vec::new(),
        }
    }

    /// Replace the root tree and return to it.
    pub fn set_root(&mut self, root: Vec<Command>) {
        self.root = root;
        self.frames.clear();
    }

    /// The root tree.
    pub fn root(&self) -> &[Command] {
        &self.root
    }

    /// Commands at the active level.
    pub fn current_items(&self) -> &[Command] {
        self.frames
            .last()
            .map_or(self.root.as_slice(), |f| f.children.as_slice())
    }

    /// The branch currently entered, `None` at the root.
    pub fn current_page(&self) -> Option<&Command> {
        self.frames.last().map(|f| &f.branch)
    }

    /// Entered branches, outermost first.
    pub fn breadcrumb(&self) -> Vec<&Command> {
        self.frames.iter().map(|f| &f.branch).collect()
    }

    /// Number of entered branches.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn can_go_back(&self) -> bool {
        !self.frames.is_empty()
    }

    /// Enter `branch`. Leaves are ignored; returns whether a page was pushed.
    pub fn push_page(&mut self, branch: &Command) -> bool {
        if !branch.is_branch() {
            return false;
        }
        self.frames.push(PageFrame {
            branch: branch.clone(),
            children: branch.children.clone(),
        });
        true
    }

    /// Leave the current page. Returns whether a page was popped.
    pub fn pop_page(&mut self) -> bool {
        self.frames.pop().is_some()
    }

    /// Return to the root.
    pub fn reset(&mut self) {
        self.frames.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> Vec<Command> {
        vec![
            Command::new("open", "Open File"),
            Command::new("theme", "Theme").with_children(vec![
                Command::new("light", "Light"),
                Command::new("dark", "Dark"),
                Command::new("contrast", "Contrast")
                    .with_children(vec![Command::new("high", "High")]),
            ]),
        ]
    }

    #[test]
    fn starts_at_root() {
        let stack = PageStack::new(tree());
        assert_eq!(stack.current_items().len(), 2);
        assert!(stack.current_page().is_none());
        assert!(stack.breadcrumb().is_empty());
        assert!(!stack.can_go_back());
    }

    #[test]
    fn push_and_pop() {
        let root = tree();
        let mut stack = PageStack::new(root.clone());
        assert!(stack.push_page(&root[1]));
        assert_eq!(stack.current_page().map(|c| c.id.as_str()), Some("theme"));
        assert_eq!(stack.current_items().len(), 3);

        let contrast = stack.current_items()[2].clone();
        assert!(stack.push_page(&contrast));
        let crumbs: Vec<_> = stack.breadcrumb().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(crumbs, vec!["theme", "contrast"]);

        assert!(stack.pop_page());
        assert_eq!(stack.current_page().map(|c| c.id.as_str()), Some("theme"));
        assert!(stack.pop_page());
        assert_eq!(stack.current_items(), root.as_slice());
    }

    #[test]
    fn push_leaf_is_noop() {
        let root = tree();
        let mut stack = PageStack::new(root.clone());
        assert!(!stack.push_page(&root[0]));
        assert_eq!(stack.depth(), 0);
    }

    #[test]
    fn pop_at_root_is_noop() {
        let mut stack = PageStack::new(tree());
        assert!(!stack.pop_page());
        assert_eq!(stack.current_items().len(), 2);
    }

    #[test]
    fn reset_returns_to_root() {
        let root = tree();
        let mut stack = PageStack::new(root.clone());
        stack.push_page(&root[1]);
        stack.reset();
        assert!(!stack.can_go_back());
        assert_eq!(stack.current_items(), root.as_slice());
    }

    #[test]
    fn set_root_clears_frames() {
        let root = tree();
        let mut stack = PageStack::new(root.clone());
        stack.push_page(&root[1]);
        stack.set_root(vec![Command::new("x", "X")]);
        assert_eq!(stack.depth(), 0);
        assert_eq!(stack.current_items().len(), 1);
    }
}
