use chat_provider::Turn;

/// What applying one fragment did to the transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FragmentOutcome {
    /// The last turn was a user turn; a new bot turn was opened.
    Opened,
    /// The open bot turn's answer grew in place.
    Extended,
    /// Nothing to attach to.
    Dropped,
}

/// Ordered question/answer turns; insertion order is display order.
///
/// Only the last turn's answer is ever mutated, and only by appending.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript {
    turns: Vec<Turn>,
}

impl Transcript {
    /// Creates a transcript holding only the greeting bot turn.
    #[must_use]
    pub fn seeded(greeting: impl Into<String>) -> Self {
        Self {
            turns: vec![Turn::bot(greeting)],
        }
    }

    #[must_use]
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    #[must_use]
    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    /// Copies the current turns, used as exchange context.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Turn> {
        self.turns.clone()
    }

    pub fn push_user(&mut self, question: impl Into<String>) {
        self.turns.push(Turn::user(question));
    }

    pub fn push_bot(&mut self, answer: impl Into<String>) {
        self.turns.push(Turn::bot(answer));
    }

    /// Folds one fragment's text into the last turn.
    pub fn apply_fragment(&mut self, text: &str) -> FragmentOutcome {
        let Some(last) = self.turns.last_mut() else {
            return FragmentOutcome::Dropped;
        };

        if last.is_user() {
            self.turns.push(Turn::bot(text));
            FragmentOutcome::Opened
        } else {
            last.append_answer(text);
            FragmentOutcome::Extended
        }
    }
}

impl From<Vec<Turn>> for Transcript {
    fn from(turns: Vec<Turn>) -> Self {
        Self { turns }
    }
}

#[cfg(test)]
mod tests {
    use chat_provider::Turn;
    use pretty_assertions::assert_eq;

    use super::{FragmentOutcome, Transcript};

    #[test]
    fn first_fragment_opens_bot_turn_and_later_ones_extend_it() {
        let mut transcript = Transcript::seeded("Hi");
        transcript.push_user("What is X?");

        assert_eq!(transcript.apply_fragment("X "), FragmentOutcome::Opened);
        assert_eq!(transcript.apply_fragment("is Y."), FragmentOutcome::Extended);

        assert_eq!(
            transcript.turns(),
            &[Turn::bot("Hi"), Turn::user("What is X?"), Turn::bot("X is Y.")]
        );
    }

    #[test]
    fn empty_transcript_drops_fragments() {
        let mut transcript = Transcript::default();
        assert_eq!(transcript.apply_fragment("lost"), FragmentOutcome::Dropped);
        assert!(transcript.is_empty());
    }

    #[test]
    fn empty_fragment_still_opens_bot_turn() {
        let mut transcript = Transcript::seeded("Hi");
        transcript.push_user("q");

        assert_eq!(transcript.apply_fragment(""), FragmentOutcome::Opened);
        assert_eq!(transcript.len(), 3);
        assert_eq!(transcript.last(), Some(&Turn::bot("")));
    }
}
