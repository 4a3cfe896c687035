#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ActiveView {
    #[default]
    Create,
    Viewer,
    Gallery,
    Logs,
}

impl ActiveView {
    pub const ALL: [ActiveView; 4] = [
        ActiveView::Create,
        ActiveView::Viewer,
        ActiveView::Gallery,
        ActiveView::Logs,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            ActiveView::Create => "Create",
            ActiveView::Viewer => "Viewer",
            ActiveView::Gallery => "Gallery",
            ActiveView::Logs => "Logs",
        }
    }

    pub fn index(&self) -> usize {
        Self::ALL.iter().position(|v| v == self).unwrap_or(0)
    }

    pub fn next(&self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(&self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}
