use crate::common;

use indexmap::IndexSet;
use std::collections;

/// Attributes to retrieve, rendered as a projection expression.
///
/// Duplicate names are ignored and the first-seen order is kept.
///
/// ```rust
/// use member_repository::common::selection::Selection;
///
/// let selection = Selection::from_iter(["username", "age"]);
/// assert_eq!(selection.len(), 2);
/// ```
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Selection(IndexSet<String>);

impl Selection {
    /// Number of selected attributes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no attribute is selected.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for Selection {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl From<Selection> for common::ExpressionInput {
    fn from(selection: Selection) -> Self {
        let operations = selection
            .0
            .into_iter()
            .map(|name| {
                let placeholder = format!("#{name}");
                common::ExpressionInput {
                    expression: placeholder.clone(),
                    expression_attribute_names: collections::HashMap::from([(placeholder, name)]),
                    ..Default::default()
                }
            })
            .collect();
        common::ExpressionInput::merge(", ", operations)
    }
}
