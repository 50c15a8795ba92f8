//! Pagination and sort parameters.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

/// One `property[,asc|desc]` sort parameter, property still unparsed.
///
/// Each listing interprets the property against its own key set and ignores
/// names it does not know.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortParam {
    pub property: String,
    pub direction: Direction,
}

impl SortParam {
    /// Parse `name`, `name,asc` or `name,desc` (direction case-insensitive).
    pub fn parse(expr: &str) -> Option<Self> {
        let mut parts = expr.split(',').map(str::trim);
        let property = parts.next().filter(|p| !p.is_empty())?;
        let direction = match parts.next() {
            Some(d) if d.eq_ignore_ascii_case("desc") => Direction::Desc,
            _ => Direction::Asc,
        };
        Some(Self {
            property: property.to_string(),
            direction,
        })
    }
}

/// Offset/size window passed to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub offset: usize,
    pub size: usize,
}

impl PageRequest {
    pub const DEFAULT_SIZE: usize = 20;

    pub fn new(offset: usize, size: usize) -> Self {
        Self { offset, size }
    }

    /// A window large enough for single-result lookups.
    pub fn single() -> Self {
        Self::new(0, 1)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(0, Self::DEFAULT_SIZE)
    }
}

/// Paging + sorting as supplied by callers of the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Pageable {
    #[serde(flatten)]
    pub page: PageRequest,
    #[serde(default)]
    pub sort: Vec<SortParam>,
}

impl Pageable {
    pub fn new(offset: usize, size: usize) -> Self {
        Self {
            page: PageRequest::new(offset, size),
            sort: Vec::new(),
        }
    }

    /// Append a sort expression; malformed expressions are dropped.
    pub fn sorted_by(mut self, expr: &str) -> Self {
        if let Some(param) = SortParam::parse(expr) {
            self.sort.push(param);
        }
        self
    }
}

/// One page of results plus the total match count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub offset: usize,
    pub size: usize,
}

impl<T> Page<T> {
    /// Cut a window out of an already filtered and sorted result set.
    pub fn slice(all: Vec<T>, request: PageRequest) -> Self {
        let total = all.len();
        let items = all
            .into_iter()
            .skip(request.offset)
            .take(request.size)
            .collect();
        Self {
            items,
            total,
            offset: request.offset,
            size: request.size,
        }
    }

    pub fn empty(request: PageRequest) -> Self {
        Self::slice(Vec::new(), request)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn into_first(self) -> Option<T> {
        self.items.into_iter().next()
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            offset: self.offset,
            size: self.size,
        }
    }
}
