use serde::Deserialize;

const TITLE_BIO_KEYWORDS: [&str; 3] = ["role", "profession", "occupation"];
const TITLE_KNOWLEDGE_KEYWORDS: [&str; 3] = ["created", "founded", "pioneered"];
const TRAIT_KEYWORDS: [&str; 3] = ["specializes", "known for", "expert in"];
const TRAIT_LIMIT: usize = 2;

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct Entity {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub bio: Vec<String>,
    #[serde(default)]
    pub knowledge: Vec<String>,
    #[serde(default)]
    pub relationships: Vec<Relationship>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct Relationship {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub relationship: String,
    #[serde(default)]
    pub details: String,
}

impl Relationship {
    /// Name of the related entity, or `None` when the entry carries no usable name.
    pub fn target_name(&self) -> Option<&str> {
        self.name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }
}

fn mentions_any(text: &str, keywords: &[&str]) -> bool {
    let lowered = text.to_lowercase();
    keywords.iter().any(|keyword| lowered.contains(keyword))
}

fn first_sentence(text: &str) -> &str {
    text.split('.').next().unwrap_or(text).trim()
}

impl Entity {
    /// One or two short lines summarising who this entity is, pulled from the
    /// bio and knowledge statements. Empty when nothing usable is present.
    pub fn display_title(&self) -> String {
        let role = self
            .bio
            .iter()
            .find(|line| mentions_any(line, &TITLE_BIO_KEYWORDS))
            .or_else(|| self.bio.first())
            .map(|line| first_sentence(line))
            .unwrap_or_default();

        let achievement = self
            .knowledge
            .iter()
            .find(|line| mentions_any(line, &TITLE_KNOWLEDGE_KEYWORDS))
            .map(|line| first_sentence(line))
            .unwrap_or_default();

        [role, achievement]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn key_traits(&self) -> Vec<&str> {
        self.knowledge
            .iter()
            .filter(|line| mentions_any(line, &TRAIT_KEYWORDS))
            .map(|line| line.trim())
            .take(TRAIT_LIMIT)
            .collect()
    }
}

#[cfg(test)]
impl Entity {
    pub(crate) fn named(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            ..Self::default()
        }
    }

    pub(crate) fn related_to(mut self, target: &str, relationship: &str) -> Self {
        self.relationships.push(Relationship {
            name: Some(target.to_owned()),
            relationship: relationship.to_owned(),
            details: String::new(),
        });
        self
    }
}
