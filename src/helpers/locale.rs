//! Built-in locales: month/weekday names and UI labels

use serde::{Deserialize, Serialize};

const PT_BR_MONTHS: [&str; 12] = [
    "janeiro", "fevereiro", "março", "abril", "maio", "junho", "julho", "agosto", "setembro",
    "outubro", "novembro", "dezembro",
];
const PT_BR_MONTHS_ABBR: [&str; 12] = [
    "jan", "fev", "mar", "abr", "mai", "jun", "jul", "ago", "set", "out", "nov", "dez",
];
const PT_BR_WEEKDAYS: [&str; 7] = [
    "domingo",
    "segunda-feira",
    "terça-feira",
    "quarta-feira",
    "quinta-feira",
    "sexta-feira",
    "sábado",
];
const PT_BR_WEEKDAYS_ABBR: [&str; 7] = ["dom", "seg", "ter", "qua", "qui", "sex", "sáb"];

const EN_US_MONTHS: [&str; 12] = [
    "January", "February", "March", "April", "May", "June", "July", "August", "September",
    "October", "November", "December",
];
const EN_US_MONTHS_ABBR: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];
const EN_US_WEEKDAYS: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];
const EN_US_WEEKDAYS_ABBR: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// Display locale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Locale {
    #[default]
    #[serde(rename = "pt-BR", alias = "pt-br", alias = "pt_BR")]
    PtBr,
    #[serde(rename = "en-US", alias = "en-us", alias = "en", alias = "en_US")]
    EnUs,
}

impl Locale {
    /// Month name, `month` is 1-based
    pub fn month_name(self, month: u32) -> &'static str {
        let idx = (month.clamp(1, 12) - 1) as usize;
        match self {
            Locale::PtBr => PT_BR_MONTHS[idx],
            Locale::EnUs => EN_US_MONTHS[idx],
        }
    }

    pub fn month_abbr(self, month: u32) -> &'static str {
        let idx = (month.clamp(1, 12) - 1) as usize;
        match self {
            Locale::PtBr => PT_BR_MONTHS_ABBR[idx],
            Locale::EnUs => EN_US_MONTHS_ABBR[idx],
        }
    }

    /// Weekday name, counted from Sunday = 0
    pub fn weekday_name(self, day: u32) -> &'static str {
        let idx = (day % 7) as usize;
        match self {
            Locale::PtBr => PT_BR_WEEKDAYS[idx],
            Locale::EnUs => EN_US_WEEKDAYS[idx],
        }
    }

    pub fn weekday_abbr(self, day: u32) -> &'static str {
        let idx = (day % 7) as usize;
        match self {
            Locale::PtBr => PT_BR_WEEKDAYS_ABBR[idx],
            Locale::EnUs => EN_US_WEEKDAYS_ABBR[idx],
        }
    }

    pub fn unknown_date(self) -> &'static str {
        match self {
            Locale::PtBr => "data desconhecida",
            Locale::EnUs => "unknown date",
        }
    }

    /// UI labels for templates
    pub fn labels(self) -> Labels {
        match self {
            Locale::PtBr => Labels {
                html_lang: "pt-BR",
                load_more: "Carregar mais posts",
                minutes: "min",
                not_found: "Post não encontrado",
                upstream_error: "Não foi possível carregar o conteúdo",
                retry: "Tentar novamente",
                back_home: "Voltar para o início",
            },
            Locale::EnUs => Labels {
                html_lang: "en-US",
                load_more: "Load more posts",
                minutes: "min",
                not_found: "Post not found",
                upstream_error: "Could not load the content",
                retry: "Try again",
                back_home: "Back to home",
            },
        }
    }
}

/// Translated UI strings
#[derive(Debug, Clone, Serialize)]
pub struct Labels {
    pub html_lang: &'static str,
    pub load_more: &'static str,
    pub minutes: &'static str,
    pub not_found: &'static str,
    pub upstream_error: &'static str,
    pub retry: &'static str,
    pub back_home: &'static str,
}
