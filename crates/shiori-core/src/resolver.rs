//! Turns note blocks and inline links into [`QueryRequest`]s.
//!
//! Block form is one `key: value` pair per line. Link form is
//! `scheme:username/segment[/segment]`, where an empty username means the
//! configured default user.

use std::collections::BTreeMap;

use crate::config::{Layout, ResolverDefaults};
use crate::error::ConfigError;
use crate::request::{ListStatus, MediaType, QueryRequest};

/// Raw key/value pairs of a block, unknown keys included.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockConfig {
    fields: BTreeMap<String, String>,
}

impl BlockConfig {
    /// Parse block text. Lines without a `:` or with an empty key or value are
    /// skipped; a repeated key keeps its last value.
    pub fn parse(text: &str) -> Self {
        let fields = text
            .lines()
            .filter_map(|line| {
                let (key, value) = line.split_once(':')?;
                let (key, value) = (key.trim(), value.trim());
                (!key.is_empty() && !value.is_empty()).then(|| (key.to_string(), value.to_string()))
            })
            .collect();
        Self { fields }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    /// Return a copy with `key` set to `value`.
    pub fn with(mut self, key: &str, value: impl Into<String>) -> Self {
        self.fields.insert(key.to_string(), value.into());
        self
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }
}

/// Where a request comes from.
#[derive(Debug, Clone, Copy)]
pub enum ConfigSource<'a> {
    Block(&'a str),
    Link(&'a str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockType {
    List,
    Single,
    Search,
    Stats,
}

/// Resolves blocks and links against injected defaults.
#[derive(Debug, Clone, Default)]
pub struct ConfigResolver {
    defaults: ResolverDefaults,
}

impl ConfigResolver {
    pub fn new(defaults: ResolverDefaults) -> Self {
        Self { defaults }
    }

    pub fn defaults(&self) -> &ResolverDefaults {
        &self.defaults
    }

    pub fn resolve(&self, source: ConfigSource<'_>) -> Result<QueryRequest, ConfigError> {
        match source {
            ConfigSource::Block(text) => self.resolve_block(&BlockConfig::parse(text)),
            ConfigSource::Link(href) => self.resolve_link(href),
        }
    }

    pub fn resolve_block(&self, block: &BlockConfig) -> Result<QueryRequest, ConfigError> {
        let block_type = match block.get("type") {
            None => BlockType::List,
            Some(value) => match value.to_ascii_lowercase().as_str() {
                "stats" => BlockType::Stats,
                "single" => BlockType::Single,
                "search" => BlockType::Search,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        key: "type",
                        value: value.to_string(),
                    })
                }
            },
        };

        let media_type = block
            .get("mediaType")
            .map(str::parse::<MediaType>)
            .transpose()?
            .unwrap_or_default();

        if block_type == BlockType::Search {
            let term = block
                .get("search")
                .filter(|term| !term.is_empty())
                .ok_or(ConfigError::MissingField("search"))?;
            return Ok(QueryRequest::Search {
                media_type,
                term: term.to_string(),
                page: parse_number(block, "page")?,
                per_page: parse_number(block, "perPage")?,
            });
        }

        let username = match block.get("username") {
            Some(name) => name.to_string(),
            None => self
                .defaults
                .default_username
                .clone()
                .ok_or(ConfigError::MissingUsername)?,
        };

        Ok(match block_type {
            BlockType::Stats => QueryRequest::Stats { username },
            BlockType::Single => QueryRequest::Single {
                username,
                media_type,
                media_id: parse_number(block, "mediaId")?
                    .ok_or(ConfigError::MissingField("mediaId"))?,
            },
            BlockType::List | BlockType::Search => QueryRequest::List {
                username,
                media_type,
                status: block
                    .get("listType")
                    .map(str::parse::<ListStatus>)
                    .transpose()?
                    .unwrap_or_default(),
            },
        })
    }

    /// Resolve a search block with the term typed by the user.
    ///
    /// The block supplies media type and paging; `type` is forced to search.
    pub fn resolve_search(
        &self,
        block: &BlockConfig,
        term: &str,
    ) -> Result<QueryRequest, ConfigError> {
        let block = block.clone().with("type", "search").with("search", term.trim());
        self.resolve_block(&block)
    }

    pub fn resolve_link(&self, href: &str) -> Result<QueryRequest, ConfigError> {
        let path = match href.split_once(':') {
            Some((scheme, rest)) if !scheme.contains('/') => rest,
            _ => href,
        };
        let parts: Vec<&str> = path.split('/').map(str::trim).collect();

        let (username, segments) = match parts.split_first() {
            Some((&"", rest)) => (
                self.defaults
                    .default_username
                    .clone()
                    .ok_or(ConfigError::MissingDefaultUsername)?,
                rest,
            ),
            Some((user, rest)) if !rest.is_empty() => (user.to_string(), rest),
            _ => return Err(ConfigError::InvalidLink(href.to_string())),
        };

        let selector = segments
            .first()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ConfigError::InvalidLink(href.to_string()))?;

        match selector.to_ascii_lowercase().as_str() {
            "stats" => Ok(QueryRequest::Stats { username }),
            media @ ("anime" | "manga") => {
                let raw_id = segments
                    .get(1)
                    .filter(|s| !s.is_empty())
                    .ok_or_else(|| ConfigError::InvalidLink(href.to_string()))?;
                let media_id = raw_id.parse::<u64>().map_err(|_| ConfigError::InvalidValue {
                    key: "mediaId",
                    value: raw_id.to_string(),
                })?;
                Ok(QueryRequest::Single {
                    username,
                    media_type: media.parse()?,
                    media_id,
                })
            }
            _ => Ok(QueryRequest::List {
                username,
                media_type: MediaType::Anime,
                status: selector.parse()?,
            }),
        }
    }

    /// The layout a block renders with: its own, else the configured default.
    pub fn layout_for(&self, block: &BlockConfig) -> Result<Layout, ConfigError> {
        block
            .get("layout")
            .map(str::parse::<Layout>)
            .transpose()
            .map(|layout| layout.unwrap_or(self.defaults.default_layout))
    }
}

fn parse_number<T: std::str::FromStr>(
    block: &BlockConfig,
    key: &'static str,
) -> Result<Option<T>, ConfigError> {
    block
        .get(key)
        .map(|raw| {
            raw.parse().map_err(|_| ConfigError::InvalidValue {
                key,
                value: raw.to_string(),
            })
        })
        .transpose()
}
