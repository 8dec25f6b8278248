//! Persona prompt and the canned replies sent instead of a model answer.

/// Sent as the system message of every completion request.
pub const SYSTEM_PROMPT: &str = "Ты — требовательный психолог-консультант, специализирующийся на зависимости от каннабиса \
(марихуана, гашиш, ТГК). Твоя задача — поддерживать пользователя в трудные моменты без жалости \
и поддакивания, помогать удерживаться от срыва, анализировать его речь и истории на противоречия, \
рационализации и самообман, а также помогать выполнять задания реального психолога. Ты говоришь прямо, \
ясно и профессионально. Поддержка = ясность + опора + ответственность. Ты не оправдываешь употребление, \
не романтизируешь зависимость и не сглаживаешь правду. Каждый ответ структурируй: (1) фиксация текущего состояния; \
(2) выявленное противоречие или искажение; (3) 1–3 прямых вопроса; (4) цена выбора; \
(5) конкретный шаг до следующего сообщения. В моменты риска срыва приоритет — стабилизация и отсрочка импульса. \
Ты не ставишь диагнозы и не назначаешь лекарства. При признаках психоза, самоповреждения или острой опасности — \
переходишь к протоколу безопасности и рекомендуешь обратиться за срочной помощью.";

/// Replies for one handler. Every field is distinct from the others.
#[derive(Debug)]
pub struct Replies {
    /// The model answered with no content.
    pub empty_reply: &'static str,
    pub authentication: &'static str,
    pub rate_limited: &'static str,
    pub connectivity: &'static str,
    /// Followed by the raw error text. Unreachable for text today: every API
    /// error maps to a named kind. Kept for errors added later.
    pub unexpected_prefix: &'static str,
}

pub const TEXT_REPLIES: Replies = Replies {
    empty_reply: "Не получил содержимого ответа. Перефразируй сообщение короче и конкретнее.",
    authentication: "Ошибка ключа OpenAI: проверь OPENAI_API_KEY (он должен начинаться с sk-...).",
    rate_limited: "OpenAI не пускает по лимиту/квоте. Проверь биллинг/квоты в OpenAI.",
    connectivity: "Проблема соединения с OpenAI. Попробуй ещё раз через минуту.",
    unexpected_prefix: "Неожиданная ошибка: ",
};

pub const VOICE_REPLIES: Replies = Replies {
    empty_reply: "Я распознал сообщение, но не получил ответа. Попробуй ещё раз короче.",
    authentication: "Ошибка ключа OpenAI: проверь OPENAI_API_KEY (sk-...).",
    rate_limited: "Голосовые сейчас недоступны: OpenAI вернул лимит/квоту (обычно нет биллинга). \
Альтернатива без карты: надиктуй текст в диктовке телефона/макбука и отправь текстом сюда.",
    connectivity: "Проблема соединения с OpenAI. Попробуй ещё раз через минуту.",
    unexpected_prefix: "Ошибка при обработке голосового: ",
};

/// Transcription came back blank.
pub const EMPTY_TRANSCRIPT: &str = "Я не смог разобрать речь. Скажи чуть медленнее и ближе к микрофону.";

pub const TRANSCODER_MISSING: &str =
    "Голосовые сейчас не работают: не найден ffmpeg. Проверь, что ffmpeg установлен: `ffmpeg -version`.";

pub const TRANSCODE_FAILED: &str =
    "Не удалось обработать аудио (ошибка конвертации). Попробуй отправить голосовое короче (2–5 сек).";
