use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandId {
    ReadPage,
    UpdateCategory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hotkey {
    pub modifiers: &'static [&'static str],
    pub key: char,
}

impl fmt::Display for Hotkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for modifier in self.modifiers {
            write!(f, "{modifier}+")?;
        }
        write!(f, "{}", self.key.to_ascii_uppercase())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandBinding {
    pub id: CommandId,
    pub slug: &'static str,
    pub name: &'static str,
    pub hotkey: Hotkey,
}

pub const COMMANDS: &[CommandBinding] = &[
    CommandBinding {
        id: CommandId::ReadPage,
        slug: "read-page",
        name: "Read ArchWiki page",
        hotkey: Hotkey {
            modifiers: &["Ctrl", "Shift"],
            key: 'r',
        },
    },
    CommandBinding {
        id: CommandId::UpdateCategory,
        slug: "update-category",
        name: "Update pages in ArchWiki category",
        hotkey: Hotkey {
            modifiers: &["Ctrl", "Shift"],
            key: 'u',
        },
    },
];

/// Match palette input against a command's slug or its hotkey letter.
pub fn lookup_command(input: &str) -> Option<&'static CommandBinding> {
    let input = input.trim();
    let mut chars = input.chars();
    let letter = match (chars.next(), chars.next()) {
        (Some(ch), None) => Some(ch.to_ascii_lowercase()),
        _ => None,
    };
    COMMANDS
        .iter()
        .find(|command| command.slug.eq_ignore_ascii_case(input) || letter == Some(command.hotkey.key))
}
