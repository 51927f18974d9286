//! Structured replies (embed-like: title, description, color, fields) and their
//! plain-text rendering for text-only transports.

pub const HP_BAR_CELLS: usize = 10;

/// Horizontal hp gauge, e.g. `🟩🟩🟩⬛⬛⬛⬛⬛⬛⬛` for 30%.
pub fn hp_bar(current: u32, maximum: u32, size: usize) -> String {
    let filled = if maximum == 0 {
        0
    } else {
        ((current.min(maximum) as usize) * size) / maximum as usize
    };
    let mut out = String::with_capacity(size * 4);
    for i in 0..size {
        out.push(if i < filled { '🟩' } else { '⬛' });
    }
    out
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reply {
    pub title: Option<String>,
    pub description: Option<String>,
    pub color: Option<u32>,
    pub fields: Vec<Field>,
    /// Error code when the reply reports a failed command
    pub code: Option<&'static str>,
}

impl Reply {
    /// Bare text reply.
    pub fn text(body: impl Into<String>) -> Self {
        Reply {
            description: Some(body.into()),
            ..Reply::default()
        }
    }

    pub fn error(code: &'static str, body: impl Into<String>) -> Self {
        Reply {
            code: Some(code),
            ..Reply::text(body)
        }
    }

    pub fn embed(title: impl Into<String>, color: u32) -> Self {
        Reply {
            title: Some(title.into()),
            color: Some(color),
            ..Reply::default()
        }
    }

    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }

    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>, inline: bool) -> Self {
        self.fields.push(Field {
            name: name.into(),
            value: value.into(),
            inline,
        });
        self
    }

    pub fn is_error(&self) -> bool {
        self.code.is_some()
    }

    /// Field value by name, first match.
    pub fn field_value(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.value.as_str())
    }

    /// Plain-text rendering, one block per field.
    pub fn render(&self) -> String {
        let mut out = String::new();
        if let Some(title) = &self.title {
            out.push_str(&format!("**{}**\n", title));
        }
        if let Some(desc) = &self.description {
            out.push_str(desc);
            out.push('\n');
        }
        for f in &self.fields {
            if f.value.contains('\n') {
                out.push_str(&format!("{}:\n{}\n", f.name, f.value));
            } else {
                out.push_str(&format!("{}: {}\n", f.name, f.value));
            }
        }
        out.trim_end().to_string()
    }
}
