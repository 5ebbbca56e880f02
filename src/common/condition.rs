use crate::{
    common,
    predicate::{Clause, Field, Operand, filter::Filter},
};

use serde_dynamo::{Result, to_attribute_value};
use std::collections;

fn get_comparison(
    field: Field,
    operator: &str,
    suffix: &str,
    operand: Operand,
    index: &mut usize,
) -> Result<common::ExpressionInput> {
    let name = field.attribute();
    let name_placeholder = format!("#{name}");
    let value_placeholder = format!(":{name}_{suffix}{index}");
    *index += 1;
    let value = to_attribute_value(operand)?;
    let operation = common::ExpressionInput {
        expression: format!("{name_placeholder} {operator} {value_placeholder}"),
        expression_attribute_names: collections::HashMap::from([(
            name_placeholder,
            name.to_string(),
        )]),
        expression_attribute_values: collections::HashMap::from([(value_placeholder, value)]),
    };
    Ok(operation)
}

impl Clause {
    fn get_expression_operation(
        self,
        index: &mut usize,
        is_nested: bool,
    ) -> Result<common::ExpressionInput> {
        match self {
            Self::Equals(field, operand) => get_comparison(field, "=", "eq", operand, index),
            Self::GreaterOrEqual(field, operand) => {
                get_comparison(field, ">=", "gte", operand, index)
            }
            Self::LessOrEqual(field, operand) => get_comparison(field, "<=", "lte", operand, index),
            Self::GreaterThan(field, operand) => get_comparison(field, ">", "gt", operand, index),
            Self::LessThan(field, operand) => get_comparison(field, "<", "lt", operand, index),
            Self::And(clauses) => {
                let is_composite = is_nested && clauses.len() > 1;
                let mut operations = Vec::with_capacity(clauses.len());
                for clause in clauses {
                    operations.push(clause.get_expression_operation(index, true)?);
                }
                let mut operation = common::ExpressionInput::merge(common::AND, operations);
                if is_composite {
                    operation.expression = format!("({})", operation.expression);
                }
                Ok(operation)
            }
        }
    }
}

impl TryFrom<Clause> for common::ExpressionInput {
    type Error = serde_dynamo::Error;

    fn try_from(clause: Clause) -> Result<Self> {
        clause.get_expression_operation(&mut 0, false)
    }
}

impl TryFrom<Filter> for Option<common::ExpressionInput> {
    type Error = serde_dynamo::Error;

    /// Render a filter, or `None` when it has no active clause.
    fn try_from(filter: Filter) -> Result<Self> {
        filter.into_clause().map(TryInto::try_into).transpose()
    }
}
