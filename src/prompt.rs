// src/prompt.rs
use crate::config::PromptStyle;
use crate::models::CheckRequest;
use serde::Serialize;

/// Instruction block of the plain prompt.
const PLAIN_PREAMBLE: [&str; 4] = [
    "Ты — эксперт по проверке решений ЕГЭ по математике.",
    "Верни ровно в таком формате:",
    "Вердикт: верно|неверно",
    "Пояснение: ...",
];

/// System message used with chat-formatted models.
pub const SYSTEM_PROMPT: &str = "Ты — эксперт ЕГЭ по математике. Твоя задача — проверить решение ученика.\n\
Отвечай СТРОГО в формате:\n\
Вердикт: верно|неверно\n\
Пояснение: <1-3 предложения, конкретно где ошибка или почему всё верно>\n\
Не добавляй ничего кроме этих двух строк.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub role: &'static str,
    pub content: String,
}

/// Trimmed value of an optional field. Only a missing or empty field is absent;
/// whitespace-only text still yields its (empty) section.
fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty()).map(str::trim)
}

fn reference_of(req: &CheckRequest) -> Option<&str> {
    if req.use_reference {
        present(req.reference_solution.as_deref())
    } else {
        None
    }
}

/// Renders the request in the configured style.
pub fn render(req: &CheckRequest, style: PromptStyle) -> String {
    match style {
        PromptStyle::Plain => build_prompt(req),
        PromptStyle::ChatMl => render_chatml(&build_messages(req)),
    }
}

/// Single instruction text: preamble, condition, solution, then the optional sections.
pub fn build_prompt(req: &CheckRequest) -> String {
    let mut parts: Vec<String> = PLAIN_PREAMBLE.iter().map(|s| s.to_string()).collect();
    parts.push(String::new());
    parts.push(format!("Условие:\n{}", req.condition.trim()));
    parts.push(String::new());
    parts.push(format!("Решение ученика:\n{}", req.student_solution.trim()));

    if let Some(reference) = reference_of(req) {
        parts.push(String::new());
        parts.push(format!("Эталонное решение:\n{}", reference));
    }
    if let Some(hint) = present(req.answer_hint.as_deref()) {
        parts.push(String::new());
        parts.push(format!("Эталонный ответ (подсказка): {}", hint));
    }

    format!("{}\n", parts.join("\n").trim())
}

/// System + user messages for chat-tuned models.
pub fn build_messages(req: &CheckRequest) -> Vec<ChatMessage> {
    let mut user = format!(
        "Условие задачи:\n{}\n\nРешение ученика:\n{}\n",
        req.condition.trim(),
        req.student_solution.trim()
    );
    if let Some(reference) = reference_of(req) {
        user.push_str(&format!("\nЭталонное решение (для сверки):\n{}\n", reference));
    }
    if let Some(hint) = present(req.answer_hint.as_deref()) {
        user.push_str(&format!("\nЭталонный ответ (подсказка): {}\n", hint));
    }

    vec![
        ChatMessage {
            role: "system",
            content: SYSTEM_PROMPT.to_string(),
        },
        ChatMessage {
            role: "user",
            content: user,
        },
    ]
}

/// ChatML template, left open at the assistant turn.
pub fn render_chatml(messages: &[ChatMessage]) -> String {
    let mut out = String::new();
    for message in messages {
        out.push_str(&format!(
            "<|im_start|>{}\n{}<|im_end|>\n",
            message.role, message.content
        ));
    }
    out.push_str("<|im_start|>assistant\n");
    out
}
