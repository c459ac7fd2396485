//! Locales, system prompts and the handful of display strings the shell
//! needs. Everything here is a pure lookup.

use crate::attachment::WarningCode;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Ru,
    De,
    Fr,
}

/// Display strings used outside the core
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiText {
    ModelLoading,
    ModelLoadError,
    ModelEmpty,
    ThoughtsSummary,
    Error,
    Ready,
    NetworkPrefix,
    AttachmentPending,
    AttachmentReadFailed,
}

impl Locale {
    pub const ALL: [Locale; 4] = [Locale::En, Locale::Ru, Locale::De, Locale::Fr];

    /// Parse a tag like "ru", "de-DE" or "FR". Unknown tags become English.
    pub fn from_tag(tag: &str) -> Self {
        let primary = tag
            .trim()
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        match primary.as_str() {
            "ru" => Locale::Ru,
            "de" => Locale::De,
            "fr" => Locale::Fr,
            _ => Locale::En,
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Ru => "ru",
            Locale::De => "de",
            Locale::Fr => "fr",
        }
    }

    /// Language code sent with each request (used server-side for OCR)
    pub fn lang_code(&self) -> &'static str {
        match self {
            Locale::En => "en-US",
            Locale::Ru => "ru-RU",
            Locale::De => "de-DE",
            Locale::Fr => "fr-FR",
        }
    }

    pub fn system_prompt(&self) -> &'static str {
        match self {
            Locale::En => "You are a helpful assistant. Reply in English.",
            Locale::Ru => "Ты — полезный помощник. Отвечай на русском языке.",
            Locale::De => "Du bist ein hilfsbereiter Assistent. Antworte auf Deutsch.",
            Locale::Fr => "Tu es un assistant utile. Réponds en français.",
        }
    }

    pub fn text(&self, key: UiText) -> &'static str {
        use Locale::*;
        use UiText::*;
        match (self, key) {
            (En, ModelLoading) => "Loading…",
            (Ru, ModelLoading) => "Загрузка…",
            (De, ModelLoading) => "Lädt…",
            (Fr, ModelLoading) => "Chargement…",

            (En, ModelLoadError) => "Failed to load models",
            (Ru, ModelLoadError) => "Не удалось загрузить модели",
            (De, ModelLoadError) => "Modelle konnten nicht geladen werden",
            (Fr, ModelLoadError) => "Impossible de charger les modèles",

            (En, ModelEmpty) => "No models found",
            (Ru, ModelEmpty) => "Модели не найдены",
            (De, ModelEmpty) => "Keine Modelle gefunden",
            (Fr, ModelEmpty) => "Aucun modèle trouvé",

            (En, ThoughtsSummary) => "💭 Model thoughts",
            (Ru, ThoughtsSummary) => "💭 Мысли модели",
            (De, ThoughtsSummary) => "💭 Gedanken des Modells",
            (Fr, ThoughtsSummary) => "💭 Réflexions du modèle",

            (En, Error) => "Error",
            (Ru, Error) => "Ошибка",
            (De, Error) => "Fehler",
            (Fr, Error) => "Erreur",

            (En, Ready) => "Done",
            (Ru, Ready) => "Готово",
            (De, Ready) => "Fertig",
            (Fr, Ready) => "Terminé",

            (En, NetworkPrefix) => "Network error: ",
            (Ru, NetworkPrefix) => "Сеть недоступна: ",
            (De, NetworkPrefix) => "Netzwerkfehler: ",
            (Fr, NetworkPrefix) => "Erreur réseau : ",

            (En, AttachmentPending) => "The attachment is still being prepared.",
            (Ru, AttachmentPending) => "Вложение ещё обрабатывается.",
            (De, AttachmentPending) => "Der Anhang wird noch vorbereitet.",
            (Fr, AttachmentPending) => "La pièce jointe est encore en préparation.",

            (En, AttachmentReadFailed) => "The file could not be read.",
            (Ru, AttachmentReadFailed) => "Не удалось прочитать файл.",
            (De, AttachmentReadFailed) => "Die Datei konnte nicht gelesen werden.",
            (Fr, AttachmentReadFailed) => "Impossible de lire le fichier.",
        }
    }

    pub fn warning_text(&self, code: WarningCode) -> &'static str {
        match (self, code) {
            (Locale::En, WarningCode::TextTruncated) => {
                "The document is too long; it will be truncated for this model."
            }
            (Locale::Ru, WarningCode::TextTruncated) => {
                "Файл слишком большой — будет использована только часть текста."
            }
            (Locale::De, WarningCode::TextTruncated) => {
                "Die Datei ist zu lang – nur ein Teil wird genutzt."
            }
            (Locale::Fr, WarningCode::TextTruncated) => {
                "Le fichier est trop long — seule une partie sera utilisée."
            }
            (Locale::En, WarningCode::PdfTruncated) => {
                "The PDF is too long; only the beginning will be processed."
            }
            (Locale::Ru, WarningCode::PdfTruncated) => {
                "PDF превышает лимит модели — обработаны будут только первые страницы."
            }
            (Locale::De, WarningCode::PdfTruncated) => {
                "Das PDF ist zu groß – nur der Anfang wird verarbeitet."
            }
            (Locale::Fr, WarningCode::PdfTruncated) => {
                "Le PDF dépasse la limite — seules les premières pages seront lues."
            }
        }
    }

    /// Render a warning key forwarded by the server. Unknown keys are shown
    /// as-is.
    pub fn server_warning_text(&self, key: &str) -> String {
        match WarningCode::from_key(key) {
            Some(code) => self.warning_text(code).to_string(),
            None => key.to_string(),
        }
    }
}
