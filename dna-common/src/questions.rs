//! Guided question bank
//!
//! The interview walks through a fixed sequence of introspective prompts,
//! two per life domain, in domain order.

use serde::Serialize;

use crate::profile::Domain;

/// One introspective prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Question {
    pub id: &'static str,
    pub domain: Domain,
    pub prompt: &'static str,
}

const STANDARD_QUESTIONS: &[Question] = &[
    Question {
        id: "childhood-earliest-memory",
        domain: Domain::Childhood,
        prompt: "What is your earliest memory, and why do you think it stayed with you?",
    },
    Question {
        id: "childhood-understood",
        domain: Domain::Childhood,
        prompt: "Describe a moment from your childhood when you felt truly understood.",
    },
    Question {
        id: "relationships-changed-you",
        domain: Domain::Relationships,
        prompt: "Tell me about someone who changed the way you see the world.",
    },
    Question {
        id: "relationships-disagreement",
        domain: Domain::Relationships,
        prompt: "How do you usually handle disagreement with people you care about?",
    },
    Question {
        id: "work-absorbed",
        domain: Domain::Work,
        prompt: "Describe a time you felt completely absorbed in what you were doing.",
    },
    Question {
        id: "work-success",
        domain: Domain::Work,
        prompt: "What does success look like to you, in your own words?",
    },
    Question {
        id: "adversity-hardest-decision",
        domain: Domain::Adversity,
        prompt: "Tell me about the hardest decision you have ever made.",
    },
    Question {
        id: "adversity-falling-apart",
        domain: Domain::Adversity,
        prompt: "When things fall apart, what do you do first?",
    },
    Question {
        id: "identity-chapter-title",
        domain: Domain::Identity,
        prompt: "If your life were a book, what would this chapter be called?",
    },
    Question {
        id: "identity-hidden-self",
        domain: Domain::Identity,
        prompt: "What part of yourself do you rarely show to other people?",
    },
    Question {
        id: "future-ten-years",
        domain: Domain::Future,
        prompt: "Picture yourself ten years from now. What are you doing, and who is with you?",
    },
    Question {
        id: "future-regret",
        domain: Domain::Future,
        prompt: "What would you regret never having tried?",
    },
];

/// Ordered list of interview questions
#[derive(Debug, Clone, Copy)]
pub struct QuestionBank {
    questions: &'static [Question],
}

impl Default for QuestionBank {
    fn default() -> Self {
        Self::standard()
    }
}

impl QuestionBank {
    /// The standard twelve-question interview
    pub fn standard() -> Self {
        Self {
            questions: STANDARD_QUESTIONS,
        }
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&'static Question> {
        self.questions.get(index)
    }

    pub fn by_id(&self, id: &str) -> Option<&'static Question> {
        self.questions.iter().find(|q| q.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &'static Question> {
        self.questions.iter()
    }
}
