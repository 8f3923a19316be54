//! Table query builder

use std::fmt;

/// Equality filter on one column
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub column: String,
    pub value: String,
}

/// Sort order on one column
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub column: String,
    pub ascending: bool,
}

/// Query against one table
///
/// ```
/// use tavola_client::backend::Query;
///
/// let q = Query::table("menu_items")
///     .select("id,name")
///     .eq("available", "true")
///     .order("created_at", false)
///     .limit(10);
/// assert_eq!(q.to_params()[0], ("select".to_string(), "id,name".to_string()));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub table: String,
    pub columns: String,
    pub filters: Vec<Filter>,
    pub order: Option<Order>,
    pub limit: Option<usize>,
}

impl Query {
    /// Select all columns of `table`
    pub fn table(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            columns: "*".to_string(),
            filters: Vec::new(),
            order: None,
            limit: None,
        }
    }

    pub fn select(mut self, columns: impl Into<String>) -> Self {
        self.columns = columns.into();
        self
    }

    pub fn eq(mut self, column: impl Into<String>, value: impl fmt::Display) -> Self {
        self.filters.push(Filter {
            column: column.into(),
            value: value.to_string(),
        });
        self
    }

    pub fn order(mut self, column: impl Into<String>, ascending: bool) -> Self {
        self.order = Some(Order {
            column: column.into(),
            ascending,
        });
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Value of the `eq` filter on `column`, if any
    pub fn filter_value(&self, column: &str) -> Option<&str> {
        self.filters
            .iter()
            .find(|f| f.column == column)
            .map(|f| f.value.as_str())
    }

    /// PostgREST query parameters
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = vec![("select".to_string(), self.columns.clone())];
        params.extend(self.filter_params());
        if let Some(order) = &self.order {
            let dir = if order.ascending { "asc" } else { "desc" };
            params.push(("order".to_string(), format!("{}.{}", order.column, dir)));
        }
        if let Some(limit) = self.limit {
            params.push(("limit".to_string(), limit.to_string()));
        }
        params
    }

    /// Only the filter parameters (`col=eq.value`)
    pub fn filter_params(&self) -> Vec<(String, String)> {
        self.filters
            .iter()
            .map(|f| (f.column.clone(), format!("eq.{}", f.value)))
            .collect()
    }
}
