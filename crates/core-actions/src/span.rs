//! Buffer positions, ranges and visual selection spans.
//!
//! The selection collaborator reports the active visual mode by its raw tag
//! (`v`, `V`, or CTRL-V) together with the selected ranges. Turning that
//! report into a [`VisualSpan`] is where an unknown tag is caught: the
//! collaborator broke its contract and there is no sensible recovery, so the
//! conversion panics.

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub const fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// Half-open range `[start, end)`; `start <= end` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TextRange {
    pub start: Position,
    pub end: Position,
}

impl TextRange {
    /// Build a range from two endpoints in either order.
    pub fn new(a: Position, b: Position) -> Self {
        if a <= b {
            Self { start: a, end: b }
        } else {
            Self { start: b, end: a }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Smallest range covering both `self` and `other`.
    pub fn cover(&self, other: &TextRange) -> TextRange {
        TextRange {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VisualKind {
    Char,
    Line,
    Block,
}

impl VisualKind {
    pub const CHAR_TAG: char = 'v';
    pub const LINE_TAG: char = 'V';
    pub const BLOCK_TAG: char = '\x16';

    pub fn tag(self) -> char {
        match self {
            VisualKind::Char => Self::CHAR_TAG,
            VisualKind::Line => Self::LINE_TAG,
            VisualKind::Block => Self::BLOCK_TAG,
        }
    }
}

/// Raw selection state as reported by the buffer-selection collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionReport {
    pub mode: char,
    pub ranges: Vec<TextRange>,
}

impl SelectionReport {
    pub fn new(kind: VisualKind, ranges: Vec<TextRange>) -> Self {
        Self {
            mode: kind.tag(),
            ranges,
        }
    }
}

/// Selected buffer region captured for one command execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VisualSpan {
    Single { kind: VisualKind, range: TextRange },
    Multi { kind: VisualKind, ranges: Vec<TextRange> },
}

impl VisualSpan {
    /// Convert a collaborator report; `None` when nothing is selected.
    ///
    /// # Panics
    ///
    /// When the report carries a mode tag other than `v`, `V` or CTRL-V.
    pub fn from_report(report: SelectionReport) -> Option<Self> {
        let kind = match report.mode {
            VisualKind::CHAR_TAG => VisualKind::Char,
            VisualKind::LINE_TAG => VisualKind::Line,
            VisualKind::BLOCK_TAG => VisualKind::Block,
            other => panic!("selection collaborator reported unrecognized visual mode {other:?}"),
        };
        let mut ranges = report.ranges;
        let first = *ranges.first()?;
        Some(match kind {
            VisualKind::Block => {
                ranges.sort_by_key(|r| r.start);
                VisualSpan::Multi { kind, ranges }
            }
            VisualKind::Char | VisualKind::Line => VisualSpan::Single {
                kind,
                range: ranges.iter().fold(first, |acc, r| acc.cover(r)),
            },
        })
    }

    pub fn kind(&self) -> VisualKind {
        match self {
            VisualSpan::Single { kind, .. } | VisualSpan::Multi { kind, .. } => *kind,
        }
    }

    pub fn ranges(&self) -> &[TextRange] {
        match self {
            VisualSpan::Single { range, .. } => std::slice::from_ref(range),
            VisualSpan::Multi { ranges, .. } => ranges,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn range(l0: usize, c0: usize, l1: usize, c1: usize) -> TextRange {
        TextRange::new(Position::new(l0, c0), Position::new(l1, c1))
    }

    #[test]
    fn range_normalizes_endpoints() {
        let r = range(3, 4, 1, 0);
        assert_eq!(r.start, Position::new(1, 0));
        assert_eq!(r.end, Position::new(3, 4));
        assert!(range(2, 2, 2, 2).is_empty());
    }

    #[test]
    fn charwise_report_becomes_single_span() {
        let report = SelectionReport::new(VisualKind::Char, vec![range(0, 2, 0, 7)]);
        let span = VisualSpan::from_report(report).unwrap();
        assert_eq!(span.kind(), VisualKind::Char);
        assert_eq!(span.ranges(), &[range(0, 2, 0, 7)]);
    }

    #[test]
    fn linewise_report_covers_all_ranges() {
        let report =
            SelectionReport::new(VisualKind::Line, vec![range(4, 0, 5, 0), range(1, 0, 2, 0)]);
        let span = VisualSpan::from_report(report).unwrap();
        assert_eq!(
            span,
            VisualSpan::Single {
                kind: VisualKind::Line,
                range: range(1, 0, 5, 0)
            }
        );
    }

    #[test]
    fn block_report_keeps_disjoint_ranges_in_order() {
        let report = SelectionReport::new(
            VisualKind::Block,
            vec![range(2, 1, 2, 3), range(0, 1, 0, 3), range(1, 1, 1, 3)],
        );
        let span = VisualSpan::from_report(report).unwrap();
        assert_eq!(span.kind(), VisualKind::Block);
        assert_eq!(
            span.ranges(),
            &[range(0, 1, 0, 3), range(1, 1, 1, 3), range(2, 1, 2, 3)]
        );
    }

    #[test]
    fn empty_report_means_no_selection() {
        let report = SelectionReport::new(VisualKind::Char, Vec::new());
        assert_eq!(VisualSpan::from_report(report), None);
    }

    #[test]
    #[should_panic(expected = "unrecognized visual mode")]
    fn unknown_mode_tag_panics() {
        let report = SelectionReport {
            mode: 's',
            ranges: vec![range(0, 0, 0, 1)],
        };
        let _ = VisualSpan::from_report(report);
    }
}
