#[cfg(test)]
mod tests {
    use rowbind_core::{
        Entity, ErrorKind, Filter, Operand, Operator, Parameter, ParameterType, Subselect, Value,
        compile_predicate,
    };
    use std::sync::Arc;
    use time::macros::{date, datetime};

    fn compile(filter: &Filter) -> (String, Vec<Parameter>) {
        let mut parameters = Vec::new();
        let sql = compile_predicate(filter, &mut parameters).expect("Could not compile the filter");
        (sql, parameters)
    }

    fn department() -> Arc<Entity> {
        Arc::new(Entity::new("HR.DEPARTMENT", "DEPT_ID", ["NAME"]).unwrap())
    }

    #[test]
    fn comparisons() {
        macro_rules! test_comparison {
            ($filter:expr, $sql:literal, $parameter:expr) => {{
                let (sql, parameters) = compile(&$filter);
                assert_eq!(sql, $sql);
                assert_eq!(parameters, [$parameter]);
            }};
        }
        test_comparison!(
            Filter::equal("ID", 42),
            "(ID = ?)",
            Parameter::new(ParameterType::Integer, 42)
        );
        test_comparison!(
            Filter::not_equal("NAME", "Ada"),
            "(NAME != ?)",
            Parameter::new(ParameterType::Varchar, "Ada")
        );
        test_comparison!(
            Filter::greater("SALARY", 1500.5),
            "(SALARY > ?)",
            Parameter::new(ParameterType::Double, 1500.5)
        );
        test_comparison!(
            Filter::greater_equal("ID", 10_i64),
            "(ID >= ?)",
            Parameter::new(ParameterType::Numeric, 10_i64)
        );
        test_comparison!(
            Filter::less("HIRED", date!(2020 - 01 - 31)),
            "(HIRED < ?)",
            Parameter::new(ParameterType::Timestamp, datetime!(2020-01-31 0:00))
        );
        test_comparison!(
            Filter::less_equal("UPDATED", datetime!(2021-06-01 12:30)),
            "(UPDATED <= ?)",
            Parameter::new(ParameterType::Timestamp, datetime!(2021-06-01 12:30))
        );
        test_comparison!(
            Filter::equal("ACTIVE", true),
            "(ACTIVE = ?)",
            Parameter::new(ParameterType::Varchar, "1")
        );
        test_comparison!(
            Filter::equal("ACTIVE", false),
            "(ACTIVE = ?)",
            Parameter::new(ParameterType::Varchar, "0")
        );
    }

    #[test]
    fn null_comparisons() {
        let (sql, parameters) = compile(&Filter::is_null("MANAGER"));
        assert_eq!(sql, "(MANAGER IS NULL)");
        assert!(parameters.is_empty());

        let (sql, parameters) = compile(&Filter::not_equal("MANAGER", Value::Null));
        assert_eq!(sql, "(MANAGER IS NOT NULL)");
        assert!(parameters.is_empty());

        let mut parameters = Vec::new();
        let error = compile_predicate(&Filter::greater("MANAGER", Value::Null), &mut parameters)
            .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::SearchConditionInvalid);
    }

    #[test]
    fn wildcards() {
        macro_rules! test_like {
            ($filter:expr, $sql:literal, $pattern:literal) => {{
                let (sql, parameters) = compile(&$filter);
                assert_eq!(sql, $sql);
                assert_eq!(parameters, [Parameter::new(ParameterType::Varchar, $pattern)]);
            }};
        }
        test_like!(Filter::starts_with("NAME", "A*"), "(NAME LIKE ?)", "A%");
        test_like!(Filter::ends_with("NAME", "A*"), "(NAME LIKE ?)", "%A");
        test_like!(Filter::contains("NAME", "A*"), "(NAME LIKE ?)", "%A%");
        test_like!(Filter::contains("NAME", "*b*c*"), "(NAME LIKE ?)", "%bc%");
        test_like!(
            Filter::build("NAME", "A", Operator::NotSw),
            "(NAME NOT LIKE ?)",
            "A%"
        );
        test_like!(
            Filter::build("NAME", "A", Operator::NotEw),
            "(NAME NOT LIKE ?)",
            "%A"
        );
        test_like!(
            Filter::build("NAME", "A", Operator::NotCo),
            "(NAME NOT LIKE ?)",
            "%A%"
        );
        test_like!(Filter::starts_with("CODE", 12), "(CODE LIKE ?)", "12%");

        let (sql, parameters) = compile(&Filter::build("ACTIVE", true, Operator::Co));
        assert_eq!(sql, "(ACTIVE LIKE ?)");
        assert_eq!(parameters, [Parameter::new(ParameterType::Varchar, "1")]);
        let (sql, parameters) = compile(&Filter::build("ACTIVE", false, Operator::NotSw));
        assert_eq!(sql, "(ACTIVE NOT LIKE ?)");
        assert_eq!(parameters, [Parameter::new(ParameterType::Varchar, "0")]);
        let (sql, parameters) = compile(&Filter::ends_with("HIRED", date!(2020 - 01 - 31)));
        assert_eq!(sql, "(HIRED LIKE ?)");
        assert_eq!(
            parameters,
            [Parameter::new(ParameterType::Timestamp, datetime!(2020-01-31 0:00))]
        );
    }

    #[test]
    fn membership() {
        let (sql, parameters) = compile(&Filter::in_list("ROLE", [1, 2, 3]));
        assert_eq!(sql, "(ROLE IN (?, ?, ?))");
        assert_eq!(
            parameters,
            ["1", "2", "3"].map(|v| Parameter::new(ParameterType::Varchar, v))
        );

        let (sql, parameters) = compile(&Filter::not_in_list("CITY", ["Rome", "Oslo"]));
        assert_eq!(sql, "(CITY NOT IN (?, ?))");
        assert_eq!(parameters.len(), 2);

        let mut parameters = Vec::new();
        let error = compile_predicate(
            &Filter::in_list("CITY", Vec::<String>::new()),
            &mut parameters,
        )
        .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::SearchConditionInvalid);
    }

    #[test]
    fn subselects() {
        let department = department();
        let (sql, parameters) = compile(&Filter::build(
            "DEPT_ID",
            Subselect::new(department.clone(), Filter::starts_with("NAME", "R*")),
            Operator::In,
        ));
        assert_eq!(
            sql,
            "(DEPT_ID IN (SELECT DEPT_ID FROM HR.DEPARTMENT WHERE (NAME LIKE ?)))"
        );
        assert_eq!(parameters, [Parameter::new(ParameterType::Varchar, "R%")]);

        let (sql, parameters) = compile(&Filter::build(
            "DEPT_ID",
            department.clone(),
            Operator::NotIn,
        ));
        assert_eq!(sql, "(DEPT_ID NOT IN (SELECT DEPT_ID FROM HR.DEPARTMENT))");
        assert!(parameters.is_empty());

        let (sql, _) = compile(&Filter::new(
            department.clone(),
            Operator::Eq,
            Operand::column("EMPLOYEE.DEPT_ID"),
        ));
        assert_eq!(sql, "(DEPT_ID = EMPLOYEE.DEPT_ID)");
    }

    #[test]
    fn logical() {
        let filter = Filter::equal("A", 1)
            .and(Filter::is_null("B").or(Filter::starts_with("C", "x")))
            .and(Filter::in_list("D", ["p", "q"]));
        let (sql, parameters) = compile(&filter);
        assert_eq!(
            sql,
            "(((A = ?) AND ((B IS NULL) OR (C LIKE ?))) AND (D IN (?, ?)))"
        );
        // One parameter per leaf except the IS NULL one, in textual order
        assert_eq!(
            parameters,
            [
                Parameter::new(ParameterType::Integer, 1),
                Parameter::new(ParameterType::Varchar, "x%"),
                Parameter::new(ParameterType::Varchar, "p"),
                Parameter::new(ParameterType::Varchar, "q"),
            ]
        );

        assert_eq!(compile(&filter), compile(&filter));
        assert_eq!(compile(&Filter::NOP).0, "");
    }

    #[test]
    fn invalid_conditions() {
        let department = department();
        macro_rules! test_invalid {
            ($filter:expr) => {{
                let mut parameters = vec![Parameter::from_value(7)];
                let error = compile_predicate(&$filter, &mut parameters).unwrap_err();
                assert_eq!(error.kind(), ErrorKind::SearchConditionInvalid);
                assert_eq!(parameters, [Parameter::from_value(7)]);
            }};
        }
        test_invalid!(Filter::build("PARENT", 1, Operator::Hierarchy));
        test_invalid!(Filter::new(Operand::Null, Operator::Eq, 1));
        test_invalid!(Filter::new(Value::from(3), Operator::Eq, 1));
        test_invalid!(Filter::build(
            "DEPT_ID",
            Subselect::new(department.clone(), Filter::NOP),
            Operator::Eq
        ));
        test_invalid!(Filter::build("DEPT_ID", Operand::collection([1]), Operator::Eq));
        test_invalid!(Filter::build("NAME", Value::Null, Operator::Sw));
        test_invalid!(Filter::new(
            Operand::column("ID"),
            Operator::And,
            Filter::equal("ID", 1)
        ));
        // The parameters of the valid part are discarded as well
        test_invalid!(Filter::equal("ID", 1).or(Filter::build("P", 1, Operator::Hierarchy)));
    }
}
