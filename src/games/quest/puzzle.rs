//! Menu-driven mini-puzzles: the switch vault and the quiz.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PuzzleKind {
    Switches,
    Quiz,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PuzzleOutcome {
    /// Keep going; progress may have advanced.
    Pending,
    /// A mistake. Progress (if any) was reset.
    Wrong(String),
    Solved,
    Left,
}

const SWITCH_LABELS: [&str; 3] = ["Switch A", "Switch B", "Switch C"];

/// Three switches that must be pressed in a fixed, hidden order.
#[derive(Clone, Debug)]
pub struct SwitchPuzzle {
    order: [usize; 3],
    progress: usize,
}

impl SwitchPuzzle {
    pub const ORDER: [usize; 3] = [2, 0, 1];

    pub fn new() -> Self {
        Self {
            order: Self::ORDER,
            progress: 0,
        }
    }

    pub fn progress(&self) -> usize {
        self.progress
    }

    pub fn press(&mut self, switch: usize) -> PuzzleOutcome {
        if self.order.get(self.progress) != Some(&switch) {
            self.progress = 0;
            return PuzzleOutcome::Wrong("Clunk. The switches snap back to their start.".into());
        }
        self.progress += 1;
        if self.progress == self.order.len() {
            PuzzleOutcome::Solved
        } else {
            PuzzleOutcome::Pending
        }
    }
}

impl Default for SwitchPuzzle {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Debug)]
pub struct QuizPuzzle {
    pub question: &'static str,
    pub options: [&'static str; 4],
    answer: usize,
}

impl QuizPuzzle {
    pub fn new() -> Self {
        Self {
            question: "How do you say \"thank you\" in Japanese?",
            options: ["Konnichiwa", "Arigatou", "Sayonara", "Sumimasen"],
            answer: 1,
        }
    }

    pub fn answer(&self, choice: usize) -> PuzzleOutcome {
        if choice == self.answer {
            PuzzleOutcome::Solved
        } else {
            PuzzleOutcome::Wrong("Wrong answer".into())
        }
    }
}

impl Default for QuizPuzzle {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Debug)]
enum Board {
    Switches(SwitchPuzzle),
    Quiz(QuizPuzzle),
}

/// An open puzzle screen with its cursor and last feedback line.
#[derive(Clone, Debug)]
pub struct PuzzleSession {
    board: Board,
    pub cursor: usize,
    feedback: Option<String>,
}

impl PuzzleSession {
    pub fn new(kind: PuzzleKind) -> Self {
        let board = match kind {
            PuzzleKind::Switches => Board::Switches(SwitchPuzzle::new()),
            PuzzleKind::Quiz => Board::Quiz(QuizPuzzle::new()),
        };
        Self {
            board,
            cursor: 0,
            feedback: None,
        }
    }

    pub fn kind(&self) -> PuzzleKind {
        match self.board {
            Board::Switches(_) => PuzzleKind::Switches,
            Board::Quiz(_) => PuzzleKind::Quiz,
        }
    }

    pub fn title(&self) -> &'static str {
        match self.board {
            Board::Switches(_) => "Switch Vault",
            Board::Quiz(_) => "Quiz",
        }
    }

    pub fn prompt(&self) -> &'static str {
        match &self.board {
            Board::Switches(_) => "Three switches. Only the right order opens the vault.",
            Board::Quiz(q) => q.question,
        }
    }

    pub fn options(&self) -> &[&'static str] {
        match &self.board {
            Board::Switches(_) => &SWITCH_LABELS,
            Board::Quiz(q) => &q.options,
        }
    }

    pub fn feedback(&self) -> Option<&str> {
        self.feedback.as_deref()
    }

    pub fn move_cursor(&mut self, down: bool) {
        let n = self.options().len();
        if n == 0 {
            return;
        }
        self.cursor = if down {
            (self.cursor + 1) % n
        } else {
            (self.cursor + n - 1) % n
        };
    }

    pub fn confirm(&mut self) -> PuzzleOutcome {
        self.choose(self.cursor)
    }

    /// Pick option `index` directly. Out-of-range picks are ignored.
    pub fn choose(&mut self, index: usize) -> PuzzleOutcome {
        if index >= self.options().len() {
            return PuzzleOutcome::Pending;
        }
        self.cursor = index;
        let outcome = match &mut self.board {
            Board::Switches(s) => s.press(index),
            Board::Quiz(q) => q.answer(index),
        };
        self.feedback = match (&outcome, &self.board) {
            (PuzzleOutcome::Wrong(msg), _) => Some(msg.clone()),
            (PuzzleOutcome::Pending, Board::Switches(s)) => {
                Some(format!("Click. {} of 3 switches hold.", s.progress()))
            }
            _ => None,
        };
        outcome
    }

    pub fn cancel(&mut self) -> PuzzleOutcome {
        PuzzleOutcome::Left
    }
}
