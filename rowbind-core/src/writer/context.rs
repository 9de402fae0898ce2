use crate::Parameter;
use std::mem;

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fragment {
    #[default]
    None,
    SqlCount,
    SqlDeleteFrom,
    SqlDeleteFromWhere,
    SqlExists,
    SqlInsertInto,
    SqlInsertIntoValues,
    SqlReturning,
    SqlSelect,
    SqlSelectFrom,
    SqlSelectOrderBy,
    SqlSelectPage,
    SqlSelectWhere,
    SqlSubselect,
    SqlUpdate,
    SqlUpdateSet,
    SqlUpdateWhere,
}

/// Compilation state: the fragment being written and the bind parameters collected so far.
///
/// Parameters are appended in textual order, so the n-th `?` of the output matches the n-th entry.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct Context {
    pub fragment: Fragment,
    pub parameters: Vec<Parameter>,
}

impl Context {
    pub fn new(fragment: Fragment) -> Self {
        Self {
            fragment,
            parameters: Vec::new(),
        }
    }

    /// Continue collecting into an existing parameter list.
    pub fn with_parameters(fragment: Fragment, parameters: Vec<Parameter>) -> Self {
        Self {
            fragment,
            parameters,
        }
    }

    pub fn bind(&mut self, parameter: Parameter) {
        self.parameters.push(parameter);
    }

    pub fn into_parameters(self) -> Vec<Parameter> {
        self.parameters
    }

    pub fn switch_fragment<'s>(&'s mut self, fragment: Fragment) -> ContextUpdater<'s> {
        ContextUpdater {
            current: Context {
                fragment,
                parameters: mem::take(&mut self.parameters),
            },
            previous: self,
        }
    }
}

/// Nested context, hands the parameters back to the enclosing one when dropped.
pub struct ContextUpdater<'a> {
    pub current: Context,
    pub previous: &'a mut Context,
}

impl<'a> Drop for ContextUpdater<'a> {
    fn drop(&mut self) {
        self.previous.parameters = mem::take(&mut self.current.parameters);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parameters_flow_back() {
        let mut context = Context::new(Fragment::SqlSelect);
        context.bind(Parameter::from_value(1));
        {
            let mut nested = context.switch_fragment(Fragment::SqlSelectWhere);
            assert_eq!(nested.current.fragment, Fragment::SqlSelectWhere);
            nested.current.bind(Parameter::from_value(2));
        }
        assert_eq!(context.fragment, Fragment::SqlSelect);
        assert_eq!(
            context.into_parameters(),
            [Parameter::from_value(1), Parameter::from_value(2)]
        );
    }
}
