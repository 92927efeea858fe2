//! List query model: filtering, sorting and page windows for user records.
//!
//! [`UserListParams`] is the raw query string as a client sent it.
//! [`UserListParams::parse`] validates it into a [`UserListQuery`], which
//! both persistence adapters interpret with the same semantics:
//!
//! - `name` is a case-insensitive substring match; `min_score` is an
//!   inclusive lower bound; filters combine with AND.
//! - Rows are ordered by the sort key in the requested direction, then by
//!   `id` ascending so equal keys never shuffle between pages.
//! - `total` counts the filtered set before the page window is applied.

use std::cmp::Ordering;

use pagination::{DEFAULT_LIMIT, DEFAULT_PAGE, MAX_LIMIT, PageRequest, PageRequestError};
use serde::Deserialize;

use super::User;
use super::validation::ValidationErrors;

/// Raw list parameters as received on the query string.
///
/// Every value is kept as text so malformed numbers can be reported per
/// parameter instead of failing extraction wholesale.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserListParams {
    /// Case-insensitive name fragment.
    pub name: Option<String>,
    /// Inclusive minimum score.
    pub min_score: Option<String>,
    /// One-based page number.
    pub page: Option<String>,
    /// Page size.
    pub limit: Option<String>,
    /// `name`, `email`, `score` or `createdAt`.
    pub sort_by: Option<String>,
    /// `asc` or `desc`.
    pub sort_order: Option<String>,
}

impl UserListParams {
    /// Validate every parameter, collecting all violations.
    ///
    /// Empty values fall back to their defaults.
    ///
    /// # Examples
    /// ```
    /// use user_api::domain::{UserListParams, UserSortField};
    ///
    /// let params = UserListParams {
    ///     min_score: Some("40".into()),
    ///     sort_by: Some("score".into()),
    ///     ..UserListParams::default()
    /// };
    /// let query = params.parse().expect("valid parameters");
    /// assert_eq!(query.filter.min_score, Some(40));
    /// assert_eq!(query.sort.field, UserSortField::Score);
    /// assert_eq!(query.window.page(), 1);
    /// ```
    pub fn parse(&self) -> Result<UserListQuery, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let min_score = match number(self.min_score.as_deref()) {
            None => None,
            Some(Ok(value)) => Some(value),
            Some(Err(NumberError::NotDigits)) => {
                errors.push("minScore", "minScore must be a non-negative integer");
                None
            }
            Some(Err(NumberError::TooLarge)) => {
                errors.push("minScore", format!("minScore must not exceed {}", u32::MAX));
                None
            }
        };
        let page = match number(self.page.as_deref()) {
            None => DEFAULT_PAGE,
            Some(Ok(value)) if value >= 1 => value,
            Some(Err(NumberError::TooLarge)) => {
                errors.push("page", format!("page must not exceed {}", u32::MAX));
                DEFAULT_PAGE
            }
            Some(_) => {
                errors.push("page", PageRequestError::InvalidPage);
                DEFAULT_PAGE
            }
        };
        let limit = match number(self.limit.as_deref()) {
            None => DEFAULT_LIMIT,
            Some(Ok(value)) if (1..=MAX_LIMIT).contains(&value) => value,
            Some(_) => {
                errors.push("limit", PageRequestError::InvalidLimit { max: MAX_LIMIT });
                DEFAULT_LIMIT
            }
        };
        let field = match non_empty(self.sort_by.as_deref()) {
            None => UserSortField::default(),
            Some(raw) => UserSortField::parse(raw).unwrap_or_else(|| {
                errors.push("sortBy", "sortBy must be one of: name, email, score, createdAt");
                UserSortField::default()
            }),
        };
        let order = match non_empty(self.sort_order.as_deref()) {
            None => SortOrder::default(),
            Some(raw) => SortOrder::parse(raw).unwrap_or_else(|| {
                errors.push("sortOrder", "sortOrder must be one of: asc, desc");
                SortOrder::default()
            }),
        };

        if !errors.is_empty() {
            return Err(errors);
        }
        let window = PageRequest::new(page, limit).map_err(|err| {
            let field = match err {
                PageRequestError::InvalidPage => "page",
                PageRequestError::InvalidLimit { .. } => "limit",
            };
            errors.push(field, err);
            errors
        })?;

        Ok(UserListQuery {
            filter: UserListFilter {
                name_contains: non_empty(self.name.as_deref()).map(str::to_owned),
                min_score,
            },
            sort: UserSort { field, order },
            window,
        })
    }
}

fn non_empty(raw: Option<&str>) -> Option<&str> {
    raw.filter(|value| !value.is_empty())
}

/// Why a numeric query parameter was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NumberError {
    /// Not a plain run of ASCII digits; signs are rejected too.
    NotDigits,
    /// Digits only, but larger than `u32::MAX`.
    TooLarge,
}

fn number(raw: Option<&str>) -> Option<Result<u32, NumberError>> {
    non_empty(raw).map(|value| {
        if !value.bytes().all(|byte| byte.is_ascii_digit()) {
            return Err(NumberError::NotDigits);
        }
        value.parse::<u32>().map_err(|_| NumberError::TooLarge)
    })
}

/// Row filters. An empty filter matches every record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserListFilter {
    /// Case-insensitive fragment the name must contain.
    pub name_contains: Option<String>,
    /// Inclusive lower bound on the score.
    pub min_score: Option<u32>,
}

impl UserListFilter {
    /// Whether `user` passes every configured filter.
    pub fn matches(&self, user: &User) -> bool {
        let name_ok = self.name_contains.as_ref().is_none_or(|needle| {
            user.name()
                .as_ref()
                .to_lowercase()
                .contains(&needle.to_lowercase())
        });
        let score_ok = self
            .min_score
            .is_none_or(|min| u32::from(user.score().value()) >= min);
        name_ok && score_ok
    }
}

/// Sortable record attribute.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum UserSortField {
    Name,
    Email,
    Score,
    #[default]
    CreatedAt,
}

impl UserSortField {
    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "name" => Some(Self::Name),
            "email" => Some(Self::Email),
            "score" => Some(Self::Score),
            "createdAt" => Some(Self::CreatedAt),
            _ => None,
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "asc" => Some(Self::Asc),
            "desc" => Some(Self::Desc),
            _ => None,
        }
    }
}

/// Single-key ordering with an `id` tie-break.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct UserSort {
    /// Primary key.
    pub field: UserSortField,
    /// Direction of the primary key. The tie-break is always ascending.
    pub order: SortOrder,
}

impl UserSort {
    /// Total order over records.
    pub fn compare(&self, left: &User, right: &User) -> Ordering {
        let primary = match self.field {
            UserSortField::Name => left.name().as_ref().cmp(right.name().as_ref()),
            UserSortField::Email => left.email().as_ref().cmp(right.email().as_ref()),
            UserSortField::Score => left.score().cmp(&right.score()),
            UserSortField::CreatedAt => left.created_at().cmp(&right.created_at()),
        };
        let primary = match self.order {
            SortOrder::Asc => primary,
            SortOrder::Desc => primary.reverse(),
        };
        primary.then_with(|| left.id().cmp(right.id()))
    }
}

/// Validated list request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserListQuery {
    /// Which records qualify.
    pub filter: UserListFilter,
    /// How qualifying records are ordered.
    pub sort: UserSort,
    /// Which slice of the ordered set is returned.
    pub window: PageRequest,
}

impl UserListQuery {
    /// Evaluate the query over an in-memory collection.
    pub fn select<'a>(&self, users: impl IntoIterator<Item = &'a User>) -> UserPage {
        let mut matching: Vec<&User> = users
            .into_iter()
            .filter(|user| self.filter.matches(user))
            .collect();
        matching.sort_by(|left, right| self.sort.compare(left, right));

        let total = matching.len() as u64;
        let skip = usize::try_from(self.window.offset()).unwrap_or(usize::MAX);
        let take = usize::try_from(self.window.limit()).unwrap_or(usize::MAX);
        let users = matching.into_iter().skip(skip).take(take).cloned().collect();
        UserPage { users, total }
    }
}

/// One page of records plus the size of the filtered set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserPage {
    /// Records in the requested window, in order.
    pub users: Vec<User>,
    /// Number of records matching the filter, ignoring the window.
    pub total: u64,
}
