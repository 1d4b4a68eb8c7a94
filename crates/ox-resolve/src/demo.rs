//! Scratch buffer plus a vim-flavoured command set.
//!
//! Just enough editing to watch the dispatcher resolve counts, registers,
//! operators with motions, open-ended captures and visual commands against
//! real text.

use anyhow::Result;
use core_actions::{
    CaptureStep, Collaborators, Command, CommandContext, CommandRecord, CommandResult,
    Dispatcher, DispatcherSettings, Executed, InputCapture, KeyEvent, KeyRemapMode, KeySequence,
    Mode, MotionCapture, MotionResolver, MotionStatus, Position, RegisterName, Repeat,
    ResolvedMotion, SelectionReport, SelectionSource, StatusSink, TextRange, VisualKind,
    VisualSpan,
};
use core_events::KeyCode;
use std::cell::RefCell;
use std::collections::HashMap;
use std::ops::Range;
use std::rc::{Rc, Weak};
use tracing::info;

const SHIFT_WIDTH: usize = 4;
const MAX_MOTION_COUNT: usize = 999_999;

/// Register contents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Yank {
    lines: Vec<String>,
    linewise: bool,
}

#[derive(Debug)]
struct Scratch {
    lines: Vec<Vec<char>>,
    cursor: Position,
    registers: HashMap<char, Yank>,
    /// Active selection: kind plus anchor; the cursor is the other end.
    visual: Option<(VisualKind, Position)>,
    mode: Mode,
    error: Option<String>,
}

impl Scratch {
    fn new(text: &str) -> Self {
        let mut lines: Vec<Vec<char>> = text.lines().map(|l| l.chars().collect()).collect();
        if lines.is_empty() {
            lines.push(Vec::new());
        }
        Self {
            lines,
            cursor: Position::default(),
            registers: HashMap::new(),
            visual: None,
            mode: Mode::Normal,
            error: None,
        }
    }

    fn last_line(&self) -> usize {
        self.lines.len() - 1
    }

    fn line_len(&self, line: usize) -> usize {
        self.lines.get(line).map_or(0, Vec::len)
    }

    fn clamp_cursor(&mut self) {
        let line = self.cursor.line.min(self.last_line());
        let max_col = match self.mode {
            Mode::Insert | Mode::Replace => self.line_len(line),
            _ => self.line_len(line).saturating_sub(1),
        };
        self.cursor = Position::new(line, self.cursor.column.min(max_col));
    }

    fn word_forward(&self, p: Position) -> Position {
        let line = &self.lines[p.line];
        if p.column >= line.len() {
            return if p.line < self.last_line() {
                Position::new(p.line + 1, 0)
            } else {
                Position::new(p.line, line.len())
            };
        }
        let mut col = p.column;
        while col < line.len() && !line[col].is_whitespace() {
            col += 1;
        }
        while col < line.len() && line[col].is_whitespace() {
            col += 1;
        }
        Position::new(p.line, col)
    }

    fn word_backward(&self, p: Position) -> Position {
        if p.column == 0 {
            return match p.line.checked_sub(1) {
                Some(prev) => Position::new(prev, self.line_len(prev).saturating_sub(1)),
                None => p,
            };
        }
        let line = &self.lines[p.line];
        let mut col = p.column.min(line.len());
        while col > 0 && line[col - 1].is_whitespace() {
            col -= 1;
        }
        while col > 0 && !line[col - 1].is_whitespace() {
            col -= 1;
        }
        Position::new(p.line, col)
    }

    fn inner_word(&self, p: Position) -> TextRange {
        let line = &self.lines[p.line];
        if line.is_empty() {
            return TextRange::new(p, p);
        }
        let col = p.column.min(line.len() - 1);
        let blank = line[col].is_whitespace();
        let mut start = col;
        while start > 0 && line[start - 1].is_whitespace() == blank {
            start -= 1;
        }
        let mut end = col + 1;
        while end < line.len() && line[end].is_whitespace() == blank {
            end += 1;
        }
        TextRange::new(Position::new(p.line, start), Position::new(p.line, end))
    }

    /// Where motion key `c` lands from `from`; `true` when linewise.
    fn target(&self, from: Position, count: usize, c: char) -> Option<(Position, bool)> {
        let len = self.line_len(from.line);
        let landed = match c {
            'h' => (Position::new(from.line, from.column.saturating_sub(count)), false),
            'l' => (Position::new(from.line, (from.column + count).min(len)), false),
            'j' => (
                Position::new((from.line + count).min(self.last_line()), from.column),
                true,
            ),
            'k' => (
                Position::new(from.line.saturating_sub(count), from.column),
                true,
            ),
            '0' => (Position::new(from.line, 0), false),
            '$' => (Position::new(from.line, len), false),
            'w' => ((0..count).fold(from, |p, _| self.word_forward(p)), false),
            'b' => ((0..count).fold(from, |p, _| self.word_backward(p)), false),
            _ => return None,
        };
        Some(landed)
    }

    /// Per-line column ranges covered by `range`.
    fn segments(&self, range: TextRange, linewise: bool) -> Vec<(usize, Range<usize>)> {
        let last = range.end.line.min(self.last_line());
        (range.start.line..=last)
            .map(|line| {
                let len = self.line_len(line);
                if linewise {
                    return (line, 0..len);
                }
                let from = if line == range.start.line {
                    range.start.column.min(len)
                } else {
                    0
                };
                let to = if line == range.end.line {
                    range.end.column.min(len)
                } else {
                    len
                };
                (line, from..to.max(from))
            })
            .collect()
    }

    fn extract(&self, range: TextRange, linewise: bool) -> Yank {
        Yank {
            lines: self
                .segments(range, linewise)
                .into_iter()
                .map(|(line, cols)| self.lines[line][cols].iter().collect())
                .collect(),
            linewise,
        }
    }

    fn delete(&mut self, range: TextRange, linewise: bool) -> Yank {
        let yank = self.extract(range, linewise);
        let first = range.start.line.min(self.last_line());
        let last = range.end.line.min(self.last_line());
        if linewise {
            self.lines.drain(first..=last);
            if self.lines.is_empty() {
                self.lines.push(Vec::new());
            }
            self.cursor = Position::new(first, 0);
        } else {
            let start = range.start.column.min(self.line_len(first));
            let end = range.end.column.min(self.line_len(last));
            let tail = self.lines[last][end..].to_vec();
            self.lines[first].truncate(start);
            self.lines[first].extend(tail);
            self.lines.drain(first + 1..=last);
            self.cursor = Position::new(first, start);
        }
        self.clamp_cursor();
        yank
    }

    fn store(&mut self, register: RegisterName, yank: Yank) {
        if !register.is_unnamed() {
            self.registers.insert(register.as_char(), yank.clone());
        }
        self.registers.insert(RegisterName::UNNAMED.as_char(), yank);
    }

    fn put(&mut self, register: RegisterName, count: usize) -> CommandResult {
        let Some(yank) = self.registers.get(&register.as_char()).cloned() else {
            return CommandResult::error(format!("Nothing in register {}", register.as_char()));
        };
        if yank.linewise {
            let at = self.cursor.line + 1;
            let block = (0..count).flat_map(|_| yank.lines.iter());
            for (offset, line) in block.enumerate() {
                self.lines.insert(at + offset, line.chars().collect());
            }
            self.cursor = Position::new(at, 0);
        } else {
            let text: String = yank.lines.join("\n").repeat(count);
            let at = Position::new(
                self.cursor.line,
                (self.cursor.column + 1).min(self.line_len(self.cursor.line)),
            );
            self.insert_text(at, &text);
        }
        CommandResult::done()
    }

    fn insert_text(&mut self, at: Position, text: &str) {
        let mut pos = at;
        for c in text.chars() {
            if c == '\n' {
                let tail = self.lines[pos.line].split_off(pos.column);
                self.lines.insert(pos.line + 1, tail);
                pos = Position::new(pos.line + 1, 0);
            } else {
                self.lines[pos.line].insert(pos.column, c);
                pos.column += 1;
            }
        }
        self.cursor = pos;
    }

    fn map_chars(&mut self, segments: Vec<(usize, Range<usize>)>, f: impl Fn(char) -> char) {
        for (line, cols) in segments {
            for c in &mut self.lines[line][cols] {
                *c = f(*c);
            }
        }
    }

    fn shift_lines(&mut self, count: usize, indent: bool) {
        let first = self.cursor.line;
        let last = (first + count.max(1) - 1).min(self.last_line());
        for line in &mut self.lines[first..=last] {
            if indent {
                for _ in 0..SHIFT_WIDTH {
                    line.insert(0, ' ');
                }
            } else {
                let blanks = line.iter().take(SHIFT_WIDTH).take_while(|c| **c == ' ').count();
                line.drain(..blanks);
            }
        }
        let indent_len = self.lines[first].iter().take_while(|c| c.is_whitespace()).count();
        self.cursor = Position::new(first, indent_len);
        self.clamp_cursor();
    }

    fn selection(&self) -> Option<SelectionReport> {
        let (kind, anchor) = self.visual?;
        let (top, bottom) = if anchor <= self.cursor {
            (anchor, self.cursor)
        } else {
            (self.cursor, anchor)
        };
        let ranges = match kind {
            VisualKind::Char => vec![TextRange::new(
                top,
                Position::new(bottom.line, bottom.column + 1),
            )],
            VisualKind::Line => vec![TextRange::new(
                Position::new(top.line, 0),
                Position::new(bottom.line, self.line_len(bottom.line)),
            )],
            VisualKind::Block => {
                let left = anchor.column.min(self.cursor.column);
                let right = anchor.column.max(self.cursor.column) + 1;
                (top.line..=bottom.line)
                    .map(|line| {
                        TextRange::new(Position::new(line, left), Position::new(line, right))
                    })
                    .collect()
            }
        };
        Some(SelectionReport::new(kind, ranges))
    }

    fn render(&self) -> Vec<String> {
        self.lines
            .iter()
            .enumerate()
            .map(|(n, line)| {
                let marker = if n == self.cursor.line { '>' } else { ' ' };
                let text: String = line.iter().collect();
                format!("{marker} {text}")
            })
            .collect()
    }
}

/// Shared handle to the scratch buffer; doubles as the dispatcher's
/// selection, motion and status collaborator.
#[derive(Clone)]
pub struct Editor(Rc<RefCell<Scratch>>);

impl Editor {
    pub fn new(text: &str) -> Self {
        Self(Rc::new(RefCell::new(Scratch::new(text))))
    }

    pub fn mode(&self) -> Mode {
        self.0.borrow().mode
    }

    pub fn set_mode(&self, mode: Mode) {
        let mut s = self.0.borrow_mut();
        s.mode = mode;
        if !matches!(mode, Mode::Visual(_)) {
            s.visual = None;
        }
        s.clamp_cursor();
    }

    pub fn take_error(&self) -> Option<String> {
        self.0.borrow_mut().error.take()
    }

    pub fn cursor(&self) -> Position {
        self.0.borrow().cursor
    }

    pub fn text(&self) -> String {
        let s = self.0.borrow();
        s.lines
            .iter()
            .map(|l| l.iter().collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn render(&self) -> Vec<String> {
        self.0.borrow().render()
    }

    fn move_cursor(&self, c: char, count: usize) -> CommandResult {
        let mut s = self.0.borrow_mut();
        let from = s.cursor;
        match s.target(from, count, c) {
            Some((to, _)) => {
                s.cursor = to;
                s.clamp_cursor();
                CommandResult::done()
            }
            None => CommandResult::error(format!("unknown motion {c}")),
        }
    }

    /// One key of a motion. `digits` is the count typed inside the motion
    /// so far; it multiplies the count typed before the operator.
    fn motion_step(&self, outer: usize, digits: Option<usize>, key: &KeyEvent) -> MotionStatus {
        let s = self.0.borrow();
        let from = s.cursor;
        if let Some(d) = key.digit().filter(|d| *d != 0 || digits.is_some()) {
            let digits = digits
                .unwrap_or(0)
                .saturating_mul(10)
                .saturating_add(d as usize)
                .min(MAX_MOTION_COUNT);
            let editor = self.clone();
            return MotionStatus::need_more(
                move |key: &KeyEvent| editor.motion_step(outer, Some(digits), key),
                Some(KeyRemapMode::OperatorPending),
            );
        }
        let count = outer
            .saturating_mul(digits.unwrap_or(1))
            .min(MAX_MOTION_COUNT);
        match key.printable() {
            Some('i') => {
                let editor = self.clone();
                MotionStatus::need_more(
                    move |key: &KeyEvent| match key.printable() {
                        Some('w') => {
                            let range = editor.0.borrow().inner_word(from);
                            MotionStatus::Complete(ResolvedMotion::charwise(range))
                        }
                        _ => MotionStatus::Error(format!("unknown text object i{key}")),
                    },
                    Some(KeyRemapMode::OperatorPending),
                )
            }
            Some(c) => match s.target(from, count, c) {
                Some((to, true)) => MotionStatus::Complete(ResolvedMotion::linewise(
                    TextRange::new(from, to),
                )),
                Some((to, false)) => {
                    MotionStatus::Complete(ResolvedMotion::charwise(TextRange::new(from, to)))
                }
                None => MotionStatus::Error(format!("unknown motion {key}")),
            },
            None if key.code == KeyCode::Esc => MotionStatus::Cancelled,
            None => MotionStatus::Error(format!("unknown motion {key}")),
        }
    }
}

impl SelectionSource for Editor {
    fn current_selection(&self) -> Option<SelectionReport> {
        self.0.borrow().selection()
    }
}

impl MotionResolver for Editor {
    fn begin(&self, count: Option<u32>) -> Box<dyn MotionCapture> {
        let editor = self.clone();
        let outer = (count.unwrap_or(1) as usize).min(MAX_MOTION_COUNT);
        Box::new(move |key: &KeyEvent| editor.motion_step(outer, None, key))
    }
}

impl StatusSink for Editor {
    fn report_error(&self, message: &str) {
        self.0.borrow_mut().error = Some(message.to_string());
    }
}

/// Insert capture: typed text goes straight into the buffer.
struct InsertCapture {
    editor: Editor,
}

impl InputCapture for InsertCapture {
    fn feed(self: Box<Self>, key: &KeyEvent, _span: Option<&VisualSpan>) -> CaptureStep {
        {
            let mut s = self.editor.0.borrow_mut();
            let at = s.cursor;
            match key.code {
                KeyCode::Esc => {
                    s.cursor.column = s.cursor.column.saturating_sub(1);
                    return CaptureStep::Finished(CommandResult::enter(Mode::Normal));
                }
                KeyCode::Enter => s.insert_text(at, "\n"),
                KeyCode::Backspace if at.column > 0 => {
                    s.lines[at.line].remove(at.column - 1);
                    s.cursor.column -= 1;
                }
                KeyCode::Backspace => {}
                KeyCode::Tab => s.insert_text(at, "\t"),
                _ => match key.printable() {
                    Some(c) => s.insert_text(at, &c.to_string()),
                    None => return CaptureStep::Cancelled,
                },
            }
        }
        CaptureStep::NeedMoreInput {
            next: self,
            remap: Some(KeyRemapMode::Insert),
        }
    }
}

fn seq(notation: &str) -> Result<KeySequence> {
    Ok(KeySequence::parse(notation)?)
}

fn count_of(count: Option<u32>) -> usize {
    count.unwrap_or(1) as usize
}

/// Build a dispatcher wired to `editor` with the demonstration command set.
pub fn build(settings: DispatcherSettings, editor: &Editor) -> Result<Rc<Dispatcher>> {
    let collab = Collaborators::default()
        .with_selection(Rc::new(editor.clone()))
        .with_motions(Rc::new(editor.clone()))
        .with_status(Rc::new(editor.clone()));
    let dispatcher = Rc::new(Dispatcher::new(settings, collab));
    for command in commands(editor)? {
        dispatcher.add(command)?;
    }

    // `.` only marks the request; replaying happens here once the run that
    // resolved it has finished.
    let weak: Weak<Dispatcher> = Rc::downgrade(&dispatcher);
    let status = editor.clone();
    dispatcher.subscribe(move |record: &CommandRecord, _: &CommandResult| {
        if record.command.name() != "repeat" {
            return;
        }
        let Some(dispatcher) = weak.upgrade() else {
            return;
        };
        match dispatcher.repeat_last(record.count) {
            Some(CommandResult::Errored(message)) => status.report_error(&message),
            Some(CommandResult::Completed(_)) => info!(target: "input.dispatch", "repeated"),
            None => status.report_error("Nothing to repeat"),
        }
    });
    Ok(dispatcher)
}

fn commands(editor: &Editor) -> Result<Vec<Command>> {
    let mut out = Vec::new();

    for (binding, name) in [
        ("h", "cursor_left"),
        ("j", "cursor_down"),
        ("k", "cursor_up"),
        ("l", "cursor_right"),
        ("w", "word_forward"),
        ("b", "word_backward"),
        ("0", "line_start"),
        ("$", "line_end"),
    ] {
        let e = editor.clone();
        let c = binding.chars().next().unwrap_or('l');
        out.push(Command::simple(seq(binding)?, name, move |count, _| {
            e.move_cursor(c, count_of(count))
        }));
    }

    let e = editor.clone();
    out.push(Command::simple(seq("x")?, "delete_char", move |count, register| {
        let mut s = e.0.borrow_mut();
        let from = s.cursor;
        if s.line_len(from.line) == 0 {
            return CommandResult::done();
        }
        let to = Position::new(from.line, from.column + count_of(count));
        let yank = s.delete(TextRange::new(from, to), false);
        s.store(register, yank);
        CommandResult::done()
    }));

    let e = editor.clone();
    out.push(Command::simple(seq("dd")?, "delete_line", move |count, register| {
        let mut s = e.0.borrow_mut();
        let from = Position::new(s.cursor.line, 0);
        let to = Position::new(s.cursor.line + count_of(count) - 1, 0);
        let yank = s.delete(TextRange::new(from, to), true);
        s.store(register, yank);
        CommandResult::done()
    }));

    let e = editor.clone();
    out.push(Command::motion(seq("d")?, "delete", move |_, register, motion| {
        let mut s = e.0.borrow_mut();
        let yank = s.delete(motion.range, motion.linewise);
        s.store(register, yank);
        CommandResult::done()
    }));

    let e = editor.clone();
    out.push(Command::simple(seq("yy")?, "yank_line", move |count, register| {
        let mut s = e.0.borrow_mut();
        let from = Position::new(s.cursor.line, 0);
        let to = Position::new(s.cursor.line + count_of(count) - 1, 0);
        let yank = s.extract(TextRange::new(from, to), true);
        s.store(register, yank);
        CommandResult::done()
    }));

    let e = editor.clone();
    out.push(Command::motion(seq("y")?, "yank", move |_, register, motion| {
        let mut s = e.0.borrow_mut();
        let yank = s.extract(motion.range, motion.linewise);
        s.store(register, yank);
        CommandResult::done()
    }));

    let e = editor.clone();
    out.push(Command::motion(seq("g~")?, "toggle_case", move |_, _, motion| {
        let mut s = e.0.borrow_mut();
        let segments = s.segments(motion.range, motion.linewise);
        s.map_chars(segments, toggle_case);
        CommandResult::done()
    }));

    let e = editor.clone();
    out.push(Command::simple(seq("g~g~")?, "toggle_case_line", move |count, _| {
        let mut s = e.0.borrow_mut();
        let from = Position::new(s.cursor.line, 0);
        let to = Position::new(s.cursor.line + count_of(count) - 1, 0);
        let segments = s.segments(TextRange::new(from, to), true);
        s.map_chars(segments, toggle_case);
        CommandResult::done()
    }));

    let e = editor.clone();
    out.push(Command::simple(seq("p")?, "put", move |count, register| {
        e.0.borrow_mut().put(register, count_of(count))
    }));

    for (binding, name, indent) in [(">>", "indent", true), ("<lt><lt>", "dedent", false)] {
        let e = editor.clone();
        out.push(Command::extended(seq(binding)?, name, move |ctx: &CommandContext| {
            let e = e.clone();
            let repeat = Repeat::new(*ctx, move |ctx| {
                e.0.borrow_mut().shift_lines(count_of(ctx.count), indent);
                CommandResult::done()
            });
            Executed::new(repeat.replay(None), repeat)
        }));
    }

    out.push(Command::simple(seq(".")?, "repeat", |_, _| CommandResult::done()));

    let e = editor.clone();
    out.push(
        Command::open_ended(
            seq("i")?,
            "insert",
            move |_: &CommandContext| -> Box<dyn InputCapture> {
                e.0.borrow_mut().mode = Mode::Insert;
                Box::new(InsertCapture { editor: e.clone() })
            },
        )
        .handling_cancel()
        .with_remap(KeyRemapMode::Insert),
    );

    let e = editor.clone();
    out.push(
        Command::open_ended(
            seq("f")?,
            "find_char",
            move |ctx: &CommandContext| -> Box<dyn InputCapture> {
                let e = e.clone();
                let nth = count_of(ctx.count);
                Box::new(move |key: &KeyEvent, _: Option<&VisualSpan>| {
                    let Some(target) = key.printable() else {
                        return CaptureStep::Cancelled;
                    };
                    let mut s = e.0.borrow_mut();
                    let Position { line, column } = s.cursor;
                    let found = s.lines[line]
                        .iter()
                        .enumerate()
                        .skip(column + 1)
                        .filter(|(_, c)| **c == target)
                        .nth(nth.saturating_sub(1))
                        .map(|(col, _)| col);
                    CaptureStep::Finished(match found {
                        Some(col) => {
                            s.cursor.column = col;
                            CommandResult::done()
                        }
                        None => CommandResult::error(format!("{target} not found")),
                    })
                })
            },
        )
        .with_remap(KeyRemapMode::Language),
    );

    for (binding, kind) in [
        ("v", VisualKind::Char),
        ("V", VisualKind::Line),
        ("<C-v>", VisualKind::Block),
    ] {
        let e = editor.clone();
        out.push(Command::simple(seq(binding)?, "visual", move |_, _| {
            let mut s = e.0.borrow_mut();
            s.visual = Some((kind, s.cursor));
            CommandResult::enter(Mode::Visual(kind))
        }));
    }

    let e = editor.clone();
    out.push(Command::visual(
        seq("X")?,
        "visual_delete",
        move |ctx: &CommandContext, span: &VisualSpan| {
            let linewise = span.kind() == VisualKind::Line;
            {
                let mut s = e.0.borrow_mut();
                let mut yanked = Yank {
                    lines: Vec::new(),
                    linewise,
                };
                // Bottom-up so earlier ranges keep their positions.
                for range in span.ranges().iter().rev() {
                    let mut part = s.delete(*range, linewise);
                    part.lines.append(&mut yanked.lines);
                    yanked.lines = part.lines;
                }
                s.store(ctx.register, yanked);
            }
            let shape = span
                .ranges()
                .first()
                .map_or(0, |r| r.end.column.saturating_sub(r.start.column));
            let rows = span.ranges().len();
            let e = e.clone();
            let repeat = Repeat::new(*ctx, move |_| {
                let mut s = e.0.borrow_mut();
                let from = s.cursor;
                let to = if linewise {
                    Position::new(from.line + rows - 1, 0)
                } else {
                    Position::new(from.line, from.column + shape)
                };
                s.delete(TextRange::new(from, to), linewise);
                CommandResult::done()
            });
            Executed::new(CommandResult::enter(Mode::Normal), repeat)
        },
    ));

    let e = editor.clone();
    out.push(
        Command::open_ended_visual(
            seq("r")?,
            "visual_replace",
            move |_: &CommandContext, _: &VisualSpan| -> Box<dyn InputCapture> {
                let e = e.clone();
                Box::new(move |key: &KeyEvent, span: Option<&VisualSpan>| {
                    let (Some(with), Some(span)) = (key.printable(), span) else {
                        return CaptureStep::Cancelled;
                    };
                    let mut s = e.0.borrow_mut();
                    let linewise = span.kind() == VisualKind::Line;
                    for range in span.ranges() {
                        let segments = s.segments(*range, linewise);
                        s.map_chars(segments, |_| with);
                    }
                    CaptureStep::Finished(CommandResult::enter(Mode::Normal))
                })
            },
        )
        .with_remap(KeyRemapMode::Language),
    );

    Ok(out)
}

fn toggle_case(c: char) -> char {
    if c.is_lowercase() {
        c.to_uppercase().next().unwrap_or(c)
    } else {
        c.to_lowercase().next().unwrap_or(c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_actions::{FeedResult, ModeTransition};
    use core_events::parse_keys;
    use pretty_assertions::assert_eq;

    const TEXT: &str = "one two three\nfour five\nsix";

    fn setup() -> (Editor, Rc<Dispatcher>) {
        let editor = Editor::new(TEXT);
        let dispatcher = build(DispatcherSettings::default(), &editor).unwrap();
        (editor, dispatcher)
    }

    /// Feed keys the way the front-end does, applying mode transitions.
    fn run(editor: &Editor, dispatcher: &Dispatcher, keys: &str) -> Vec<FeedResult> {
        let results = dispatcher.feed_all(parse_keys(keys).unwrap());
        for result in &results {
            match result {
                FeedResult::CommandRan {
                    transition: ModeTransition::Enter(mode),
                    ..
                } => editor.set_mode(*mode),
                FeedResult::CommandCancelled => editor.set_mode(Mode::Normal),
                _ => {}
            }
        }
        results
    }

    #[test]
    fn delete_word_with_count_and_register() {
        let (editor, dispatcher) = setup();
        run(&editor, &dispatcher, "\"a2dw");
        assert_eq!(editor.text(), "three\nfour five\nsix");
        run(&editor, &dispatcher, "j\"ap");
        assert_eq!(editor.text(), "three\nfone two our five\nsix");
    }

    #[test]
    fn doubled_operator_and_toggle_case() {
        let (editor, dispatcher) = setup();
        run(&editor, &dispatcher, "g~g~");
        assert_eq!(editor.text(), "ONE TWO THREE\nfour five\nsix");
        run(&editor, &dispatcher, "jg~w");
        assert_eq!(editor.text(), "ONE TWO THREE\nFOUR five\nsix");
        run(&editor, &dispatcher, "dd");
        assert_eq!(editor.text(), "ONE TWO THREE\nsix");
    }

    #[test]
    fn insert_then_repeat_indent() {
        let (editor, dispatcher) = setup();
        run(&editor, &dispatcher, "ihey <Esc>");
        assert_eq!(editor.mode(), Mode::Normal);
        assert_eq!(editor.text(), "hey one two three\nfour five\nsix");
        run(&editor, &dispatcher, ">>j.");
        assert_eq!(
            editor.text(),
            "    hey one two three\n    four five\nsix"
        );
        assert!(editor.take_error().is_none());
    }

    #[test]
    fn find_char_and_visual_block_delete() {
        let (editor, dispatcher) = setup();
        run(&editor, &dispatcher, "fe");
        assert_eq!(editor.cursor(), Position::new(0, 2));
        run(&editor, &dispatcher, "0<C-v>jlX");
        assert_eq!(editor.mode(), Mode::Normal);
        assert_eq!(editor.text(), "e two three\nur five\nsix");
    }

    #[test]
    fn visual_commands_need_a_selection() {
        let (editor, dispatcher) = setup();
        let results = run(&editor, &dispatcher, "X");
        assert!(matches!(results[0], FeedResult::NoMatchingCommand));
        run(&editor, &dispatcher, "Vrz");
        assert_eq!(editor.text(), "zzzzzzzzzzzzz\nfour five\nsix");
    }

    #[test]
    fn digits_inside_a_motion_read_as_one_number() {
        let editor = Editor::new("a b c d e f g h i j k l m n o");
        let dispatcher = build(DispatcherSettings::default(), &editor).unwrap();
        run(&editor, &dispatcher, "d12w");
        assert_eq!(editor.text(), "m n o");

        let editor = Editor::new("a b c d e f g h i j k l m n o");
        let dispatcher = build(DispatcherSettings::default(), &editor).unwrap();
        run(&editor, &dispatcher, "2d3w");
        assert_eq!(editor.text(), "g h i j k l m n o");
        run(&editor, &dispatcher, "d10w");
        assert_eq!(editor.text(), "");
    }

    #[test]
    fn long_digit_runs_inside_a_motion_saturate() {
        let (editor, dispatcher) = setup();
        let results = run(&editor, &dispatcher, "9d99999999999999999999999l");
        assert!(matches!(
            results.last(),
            Some(FeedResult::CommandRan { .. })
        ));
        assert_eq!(editor.text(), "\nfour five\nsix");
        assert!(editor.take_error().is_none());
    }

    #[test]
    fn motion_errors_reach_the_status_line() {
        let (editor, dispatcher) = setup();
        let results = run(&editor, &dispatcher, "dq");
        assert!(matches!(results[1], FeedResult::CommandCancelled));
        assert_eq!(editor.take_error().as_deref(), Some("unknown motion q"));
        assert_eq!(editor.text(), TEXT);
    }
}
