#[cfg(test)]
mod tests {
    use rowbind::{
        Binding, Count, Delete, Entity, ErrorKind, Exists, Filter, Flavor, Insert, Operand,
        Operator, Parameter, ParameterType, Projection, Resource, Select, Sort, State, Statement,
        StatementConfig, Update, Value,
    };
    use rowbind_mock::{Event, MockDriver, MockRows, Response, init_logs};
    use rust_decimal::Decimal;
    use std::{sync::Arc, time::Duration};
    use time::macros::datetime;

    fn employee() -> Arc<Entity> {
        Arc::new(
            Entity::new(
                "HR.EMPLOYEE",
                "EMP_ID",
                [("NAME", "name"), ("SALARY", "salary")],
            )
            .unwrap(),
        )
    }

    fn resource(flavor: Flavor) -> Resource {
        Resource::new(flavor, "db.local", "scott", "tiger")
    }

    #[test]
    fn select_rows() {
        init_logs();
        let driver = MockDriver::new().respond(Response::Rows(
            MockRows::new(["NAME", "ROWNUMBER"])
                .row([Value::from("Ada"), Value::Numeric(1)])
                .row([Value::Null, Value::Numeric(2)]),
        ));
        let mut connection = driver.connection(&resource(Flavor::MySql));
        let mut select = Select::build(
            employee(),
            Filter::build("EMP_ID", 42, Operator::Eq),
            [("NAME", "NAME")],
        )
        .with_config(StatementConfig::new(Duration::from_secs(3)));
        assert_eq!(select.state(), State::Unprepared);
        assert_eq!(select.text(), "");

        select.prepare(&mut connection).unwrap();
        assert_eq!(select.state(), State::Prepared);
        assert_eq!(
            select.to_string(),
            "SELECT NAME AS NAME, ROWNUM AS ROWNUMBER FROM HR.EMPLOYEE WHERE (EMP_ID = ?)"
        );
        assert_eq!(select.parameters().len(), 1);

        let rows = select.execute().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].names(), ["NAME"]);
        assert_eq!(rows[0].get_column("NAME"), Some(&Value::from("Ada")));
        assert_eq!(rows[1].values(), [Value::Null]);

        select.close();
        assert_eq!(select.state(), State::Closed);
        assert_eq!(
            driver.bindings(),
            [(0, ParameterType::Integer, Value::Integer(42))]
        );
        let events = driver.events();
        assert!(events.contains(&Event::QueryTimeout(Duration::from_secs(3))));
        assert_eq!(driver.count(|v| *v == Event::CloseCursor), 1);
        assert_eq!(driver.count(|v| *v == Event::ClosePrepared), 1);
    }

    #[test]
    fn select_joined_and_paged() {
        let department = Arc::new(Entity::new("HR.DEPARTMENT", "DEPT_ID", ["TITLE"]).unwrap());
        let driver = MockDriver::new();
        let mut connection = driver.connection(&resource(Flavor::Postgres));
        let mut select = Select::joined(
            [employee(), department],
            Filter::new(
                Operand::column("EMPLOYEE.DEPT_ID"),
                Operator::Eq,
                Operand::column("DEPARTMENT.DEPT_ID"),
            ),
            Filter::starts_with("TITLE", "Sales"),
        )
        .order_by(Sort::asc("NAME"))
        .page(1, 10);
        let rows = select.run(&mut connection).unwrap();
        assert!(rows.is_empty());
        assert_eq!(
            driver.prepared(),
            ["SELECT * FROM (SELECT EMP_ID AS EMP_ID, NAME AS name, SALARY AS salary, \
              DEPT_ID AS DEPT_ID, TITLE AS TITLE, ROWNUM AS ROWNUMBER \
              FROM HR.EMPLOYEE, HR.DEPARTMENT \
              WHERE ((EMPLOYEE.DEPT_ID = DEPARTMENT.DEPT_ID) AND (TITLE LIKE ?)) \
              ORDER BY NAME ASC) WHERE ROWNUMBER BETWEEN ? AND ?"]
        );
        assert_eq!(
            driver.bindings(),
            [
                (0, ParameterType::Varchar, Value::from("Sales%")),
                (1, ParameterType::Numeric, Value::Numeric(1)),
                (2, ParameterType::Numeric, Value::Numeric(10)),
            ]
        );
        assert_eq!(select.state(), State::Closed);
    }

    #[test]
    fn execute_with_new_parameters() {
        let driver = MockDriver::new()
            .respond(Response::Rows(MockRows::new(["RS"]).row([3_i64])))
            .respond(Response::Rows(MockRows::new(["RS"]).row([Decimal::from(8)])));
        let mut connection = driver.connection(&resource(Flavor::Oracle));
        let mut count = Count::build(employee(), Filter::greater("SALARY", 100));
        count.prepare(&mut connection).unwrap();
        assert_eq!(count.execute().unwrap(), 3);
        assert_eq!(
            count
                .execute_with(vec![Parameter::from_value(5000)])
                .unwrap(),
            8
        );
        assert_eq!(
            driver.bindings(),
            [
                (0, ParameterType::Integer, Value::Integer(100)),
                (0, ParameterType::Integer, Value::Integer(5000)),
            ]
        );
        assert_eq!(driver.count(|v| *v == Event::CloseCursor), 2);
    }

    #[test]
    fn count_and_exists() {
        let driver = MockDriver::new()
            .respond(Response::Rows(MockRows::new(["RS"]).row([12])))
            .respond(Response::Rows(MockRows::new(["RS"])))
            .respond(Response::Rows(MockRows::new(["x"]).row(["x"])))
            .respond(Response::Rows(MockRows::new(["x"])));
        let mut connection = driver.connection(&resource(Flavor::Oracle));
        let filter = Filter::is_null("SALARY");
        assert_eq!(
            Count::build(employee(), filter.clone())
                .run(&mut connection)
                .unwrap(),
            12
        );
        assert_eq!(
            Count::build(employee(), filter.clone())
                .run(&mut connection)
                .unwrap(),
            0
        );
        assert!(
            Exists::build(employee(), filter.clone())
                .run(&mut connection)
                .unwrap()
        );
        assert!(
            !Exists::build(employee(), filter)
                .run(&mut connection)
                .unwrap()
        );
        assert_eq!(
            driver.prepared()[..2],
            [
                "SELECT COUNT(EMP_ID) AS RS FROM HR.EMPLOYEE WHERE (SALARY IS NULL)",
                "SELECT COUNT(EMP_ID) AS RS FROM HR.EMPLOYEE WHERE (SALARY IS NULL)",
            ]
        );
        assert!(driver.bindings().is_empty());
    }

    #[test]
    fn insert_returning() {
        init_logs();
        let driver = MockDriver::new()
            .respond(Response::Affected(1))
            .returned([
                Value::Integer(77),
                Value::Binary(Box::new([0xDE, 0xAD])),
                Value::from("2024-03-01 10:00:00"),
            ]);
        let mut connection = driver.connection(&resource(Flavor::Oracle));
        let mut insert = Insert::build(
            employee(),
            [
                Binding::new("name", "Grace"),
                Binding::null("salary", ParameterType::Decimal),
            ],
        )
        .returning("EMP_ID", ParameterType::Numeric)
        .returning("TOKEN", ParameterType::Binary)
        .returning("CREATED", ParameterType::Timestamp);
        let result = insert.run(&mut connection).unwrap();
        assert_eq!(result.rows_affected, 1);
        assert_eq!(result.returned["EMP_ID"], Value::Numeric(77));
        assert_eq!(result.returned["TOKEN"], Value::from("DEAD"));
        assert_eq!(
            result.returned["CREATED"],
            Value::Timestamp(datetime!(2024-03-01 10:00))
        );
        assert_eq!(
            driver.prepared(),
            ["INSERT INTO HR.EMPLOYEE (NAME, SALARY) VALUES (?, ?) \
              RETURNING EMP_ID, TOKEN, CREATED INTO ?, ?, ?"]
        );
        assert_eq!(
            driver.bindings(),
            [
                (0, ParameterType::Varchar, Value::from("Grace")),
                (1, ParameterType::Decimal, Value::Null),
            ]
        );
        let registered: Vec<_> = driver
            .events()
            .into_iter()
            .filter_map(|v| match v {
                Event::RegisterReturn { index, ty } => Some((index, ty)),
                _ => None,
            })
            .collect();
        assert_eq!(
            registered,
            [
                (2, ParameterType::Numeric),
                (3, ParameterType::Binary),
                (4, ParameterType::Timestamp),
            ]
        );
    }

    #[test]
    fn update_returning() {
        let driver = MockDriver::new()
            .respond(Response::Affected(1))
            .returned([Value::Integer(9)]);
        let mut connection = driver.connection(&resource(Flavor::Oracle));
        let result = Update::build(
            employee(),
            [
                Binding::new("name", "Grace"),
                Binding::typed("salary", ParameterType::Decimal, Decimal::new(100, 0)),
            ],
            Filter::equal("EMP_ID", 9),
        )
        .returning("EMP_ID", ParameterType::Numeric)
        .run(&mut connection)
        .unwrap();
        assert_eq!(result.returned["EMP_ID"], Value::Numeric(9));
        assert_eq!(
            driver.prepared(),
            ["UPDATE HR.EMPLOYEE SET NAME = ?, SALARY = ? WHERE (EMP_ID = ?) \
              RETURNING EMP_ID INTO ?"]
        );
        let events: Vec<_> = driver
            .events()
            .into_iter()
            .filter(|v| {
                matches!(
                    v,
                    Event::Bind { .. } | Event::RegisterReturn { .. } | Event::ExecuteUpdate
                )
            })
            .collect();
        assert_eq!(
            events,
            [
                Event::Bind {
                    index: 0,
                    ty: ParameterType::Varchar,
                    value: Value::from("Grace"),
                },
                Event::Bind {
                    index: 1,
                    ty: ParameterType::Decimal,
                    value: Value::Decimal(Decimal::new(100, 0)),
                },
                Event::Bind {
                    index: 2,
                    ty: ParameterType::Integer,
                    value: Value::Integer(9),
                },
                Event::RegisterReturn {
                    index: 3,
                    ty: ParameterType::Numeric,
                },
                Event::ExecuteUpdate,
            ]
        );
    }

    #[test]
    fn returning_without_values() {
        let driver = MockDriver::new().respond(Response::Affected(1));
        let mut connection = driver.connection(&resource(Flavor::Oracle));
        let error = Insert::build(employee(), [Binding::new("name", "Grace")])
            .returning("EMP_ID", ParameterType::Numeric)
            .run(&mut connection)
            .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Driver);
        assert_eq!(driver.count(|v| *v == Event::ClosePrepared), 1);
    }

    #[test]
    fn execute_with_parameter_count() {
        let driver = MockDriver::new();
        let mut connection = driver.connection(&resource(Flavor::Oracle));
        let mut insert = Insert::build(
            employee(),
            [Binding::new("name", "Grace"), Binding::new("salary", 100)],
        )
        .returning("EMP_ID", ParameterType::Numeric);
        insert.prepare(&mut connection).unwrap();
        let error = insert
            .execute_with(vec![Parameter::new(ParameterType::Varchar, "Ada")])
            .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::ArgumentBadValue);
        assert_eq!(insert.parameters().len(), 2);
        assert_eq!(
            driver.count(|v| matches!(v, Event::RegisterReturn { .. } | Event::ExecuteUpdate)),
            0
        );
    }

    #[test]
    fn returning_needs_dialect_support() {
        let driver = MockDriver::new();
        let mut connection = driver.connection(&resource(Flavor::MySql));
        let error = Insert::build(employee(), [Binding::new("name", "Grace")])
            .returning("EMP_ID", ParameterType::Numeric)
            .run(&mut connection)
            .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::ArgumentBadValue);
        // Rejected before reaching the driver
        assert!(driver.prepared().is_empty());
    }

    #[test]
    fn update_and_delete() {
        let driver = MockDriver::new()
            .respond(Response::Affected(2))
            .respond(Response::Affected(4));
        let mut connection = driver.connection(&resource(Flavor::Db2));
        let result = Update::build(
            employee(),
            [Binding::typed("salary", ParameterType::Decimal, Decimal::new(25050, 2))],
            Filter::in_list("EMP_ID", [1, 2]),
        )
        .run(&mut connection)
        .unwrap();
        assert_eq!(result.rows_affected, 2);
        assert!(result.returned.is_empty());

        let result = Delete::build(employee(), Filter::less("SALARY", 10))
            .run(&mut connection)
            .unwrap();
        assert_eq!(result.rows_affected, 4);
        assert_eq!(
            driver.prepared(),
            [
                "UPDATE HR.EMPLOYEE SET SALARY = ? WHERE (EMP_ID IN (?, ?))",
                "DELETE FROM HR.EMPLOYEE WHERE (SALARY < ?)",
            ]
        );
        assert_eq!(
            driver.bindings(),
            [
                (0, ParameterType::Decimal, Value::Decimal(Decimal::new(25050, 2))),
                (1, ParameterType::Varchar, Value::from("1")),
                (2, ParameterType::Varchar, Value::from("2")),
                (0, ParameterType::Integer, Value::Integer(10)),
            ]
        );
    }

    #[test]
    fn nothing_affected() {
        let driver = MockDriver::new();
        let mut connection = driver.connection(&resource(Flavor::Oracle));
        let error = Insert::build(employee(), [Binding::new("name", "Linus")])
            .run(&mut connection)
            .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::ObjectNotCreated);
        let error = Update::build(
            employee(),
            [Binding::new("name", "Linus")],
            Filter::equal("EMP_ID", 1),
        )
        .run(&mut connection)
        .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::ObjectNotModified);
        let error = Delete::build(employee(), Filter::equal("EMP_ID", 1))
            .run(&mut connection)
            .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::ObjectNotDeleted);
        // Every statement was closed anyway
        assert_eq!(driver.count(|v| *v == Event::ClosePrepared), 3);
    }

    #[test]
    fn lifecycle() {
        let driver = MockDriver::new();
        let mut connection = driver.connection(&resource(Flavor::Oracle));
        let mut select = Select::build(employee(), Filter::NOP, [Projection::from("NAME")]);

        let error = select.execute().unwrap_err();
        assert_eq!(error.kind(), ErrorKind::InstanceAttributeNull);

        select.prepare(&mut connection).unwrap();
        let error = select.prepare(&mut connection).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::InstanceIllegalState);

        select.close();
        select.close();
        assert_eq!(driver.count(|v| *v == Event::ClosePrepared), 1);
        let error = select.execute().unwrap_err();
        assert_eq!(error.kind(), ErrorKind::InstanceIllegalState);
        let error = select.prepare(&mut connection).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::InstanceIllegalState);
    }

    #[test]
    fn invalid_filter_skips_driver() {
        let driver = MockDriver::new();
        let mut connection = driver.connection(&resource(Flavor::Oracle));
        let error = Delete::build(
            employee(),
            Filter::build("EMP_ID", 3, Operator::Hierarchy),
        )
        .run(&mut connection)
        .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::SearchConditionInvalid);
        assert!(driver.events().is_empty());
    }

    #[test]
    fn driver_failures_release_resources() {
        init_logs();
        let driver = MockDriver::new()
            .respond(Response::Failure("ORA-00942: table or view does not exist".into()))
            .respond(Response::Rows(MockRows::new(["OTHER"]).row([1])))
            .failing_close();
        let mut connection = driver.connection(&resource(Flavor::Oracle));

        let error = Select::build(employee(), Filter::NOP, ["NAME"])
            .run(&mut connection)
            .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Driver);
        assert!(error.message().contains("ORA-00942"));
        assert_eq!(driver.count(|v| *v == Event::ClosePrepared), 1);

        // Missing column, the cursor is still closed and its close failure only logged
        let error = Select::build(employee(), Filter::NOP, ["NAME"])
            .run(&mut connection)
            .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Driver);
        assert_eq!(driver.count(|v| *v == Event::CloseCursor), 1);
        assert_eq!(driver.count(|v| *v == Event::ClosePrepared), 2);
    }
}
