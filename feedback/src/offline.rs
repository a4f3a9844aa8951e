//! Deterministic stand-in used when no API key is configured.
//!
//! A question counts as measurable when it mentions a number or one of the
//! usual quantity words; the feedback strings keep the guide persona so the
//! mission flow reads the same with or without the network.

use crate::{QuestionVerdict, TopicIdeas};

pub(crate) const ERROR_FEEDBACK: &str = "¡Uy, parece que mis circuitos se mojaron! Hubo un \
error. Intenta de nuevo o revisa tu pregunta.";

const APPROVED_FEEDBACK: &str =
    "¡Pregunta Aprobada! ¡Esa pregunta está con todo! ¡Bien pensado, Guardianes!";

const RETRY_FEEDBACK: &str = "¡Casi! Esa pregunta es genial, pero... ¿cómo la MEDIMOS? Intenta \
de nuevo usando palabras como 'Cuántos' o 'Qué tan rápido'. ¡Échenle coco!";

const QUANTITY_MARKERS: [&str; 5] = ["cuánto", "cuántos", "cuántas", "porcentaje", "qué tan"];

pub(crate) fn assess_question(question: &str) -> QuestionVerdict {
    let lower = question.to_lowercase();
    let measurable = lower.chars().any(|c| c.is_ascii_digit())
        || QUANTITY_MARKERS.iter().any(|marker| lower.contains(marker));

    if measurable {
        QuestionVerdict {
            is_measurable: true,
            feedback: APPROVED_FEEDBACK.to_string(),
        }
    } else {
        QuestionVerdict {
            is_measurable: false,
            feedback: RETRY_FEEDBACK.to_string(),
        }
    }
}

pub(crate) fn suggest_topics(topic: &str) -> TopicIdeas {
    let topic = topic.trim();
    let topic = if topic.is_empty() { "el agua" } else { topic };
    TopicIdeas {
        ideas: vec![
            format!("¿Cuántos litros diarios se relacionan con {topic} en la escuela?"),
            format!("¿Qué porcentaje del grupo puede explicar {topic}?"),
            format!("¿Qué tan rápido cambia {topic} a lo largo de una semana?"),
        ],
    }
}
