use dashmap::DashMap;
use rust_embed::Embed;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use thiserror::Error;

const PROJECTS_FILE: &str = "projects.json";

/// Query results keyed by lowercased category ("" = all).
pub static GLOBAL_PROJECT_CACHE: LazyLock<DashMap<String, Vec<Project>>> =
    LazyLock::new(DashMap::new);

#[derive(Embed)]
#[folder = "content"]
#[cfg_attr(feature = "hydrate", metadata_only = true)]
pub struct Assets;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: u32,
    pub title: String,
    pub category: String,
    pub description: String,
    pub image: String,
    pub tags: Vec<String>,
    pub year: String,
    pub link: String,
    pub github: String,
    #[serde(default)]
    pub featured: bool,
}

#[derive(Error, Debug, Clone)]
pub enum ProjectError {
    #[error("Project list not found")]
    NotFound,
    #[error("Couldn't parse project list: {0}")]
    ParseError(String),
}

/// Returns the bundled projects in `category` (case-insensitive, empty for
/// all), featured first and then by id.
#[cfg(any(feature = "ssr", test))]
pub fn get_projects(category: &str) -> Result<Vec<Project>, ProjectError> {
    let key = category.trim().to_lowercase();
    let cache = &*GLOBAL_PROJECT_CACHE;
    if let Some(r) = cache.get(&key) {
        return Ok(r.clone());
    }

    let content = Assets::get(PROJECTS_FILE).ok_or(ProjectError::NotFound)?;
    let all = parse_projects(&content.data)?;
    let projects = filter_projects(all, &key);
    cache.insert(key, projects.clone());
    Ok(projects)
}

#[cfg(any(feature = "ssr", test))]
fn parse_projects(data: &[u8]) -> Result<Vec<Project>, ProjectError> {
    serde_json::from_slice(data).map_err(|e| ProjectError::ParseError(e.to_string()))
}

#[cfg(any(feature = "ssr", test))]
fn filter_projects(mut projects: Vec<Project>, category: &str) -> Vec<Project> {
    if !category.is_empty() {
        projects.retain(|p| p.category.to_lowercase() == category);
    }
    projects.sort_by(|a, b| b.featured.cmp(&a.featured).then(a.id.cmp(&b.id)));
    projects
}

/// Distinct categories in first-seen order.
/// Stores a successful load under `key`. Failures are left out so the next
/// request for the same key goes back to the server.
pub fn remember<E>(
    cache: &DashMap<String, Vec<Project>>,
    key: String,
    loaded: &Result<Vec<Project>, E>,
) {
    if let Ok(projects) = loaded {
        cache.insert(key, projects.clone());
    }
}

pub fn categories(projects: &[Project]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for p in projects {
        if !out.iter().any(|c| c.eq_ignore_ascii_case(&p.category)) {
            out.push(p.category.clone());
        }
    }
    out
}

/// Index state of the project carousel. Navigation wraps at both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Carousel {
    index: usize,
    len: usize,
}

impl Carousel {
    pub fn new(len: usize) -> Self {
        Self { index: 0, len }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn next(&mut self) {
        if self.len > 0 {
            self.index = (self.index + 1) % self.len;
        }
    }

    pub fn prev(&mut self) {
        if self.len > 0 {
            self.index = (self.index + self.len - 1) % self.len;
        }
    }

    /// Jumps to `index`; out of range is ignored.
    pub fn select(&mut self, index: usize) {
        if index < self.len {
            self.index = index;
        }
    }

    /// Keeps the position valid after the list it indexes changes length.
    pub fn resize(&mut self, len: usize) {
        self.len = len;
        if self.index >= len {
            self.index = 0;
        }
    }
}
