use crate::{
    Connection, Cursor, Error, ErrorKind, Parameter, ParameterType, Prepared, Result, RowLabeled,
    RowNames, SqlWriter, State, StatementConfig, Value, truncate_long, util::log_close_error,
};
use std::fmt::{self, Display, Formatter};

pub(crate) use crate::error::driver_error;

/// Compiled text, bind parameters and driver handle shared by every statement kind.
pub struct StatementCore {
    text: String,
    parameters: Vec<Parameter>,
    handle: Option<Box<dyn Prepared>>,
    state: State,
    config: StatementConfig,
}

impl StatementCore {
    pub fn new(config: StatementConfig) -> Self {
        Self {
            text: String::new(),
            parameters: Vec::new(),
            handle: None,
            state: State::Unprepared,
            config,
        }
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    pub fn config(&self) -> &StatementConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: StatementConfig) {
        self.config = config;
    }

    /// Compile through the connection's dialect and obtain the driver handle.
    ///
    /// The compilation runs before any driver call, a statement that does not compile leaves the
    /// connection untouched.
    pub fn prepare<F>(&mut self, connection: &mut dyn Connection, compile: F) -> Result<()>
    where
        F: FnOnce(&dyn SqlWriter, &mut String) -> Result<Vec<Parameter>>,
    {
        if self.state != State::Unprepared {
            return Err(Error::illegal_state(format!(
                "Cannot prepare a {} statement",
                self.state
            )));
        }
        let mut text = String::new();
        let parameters = compile(connection.sql_writer(), &mut text)?;
        log::debug!("Preparing: {}", truncate_long!(text));
        let handle = connection.prepare(&text).map_err(driver_error)?;
        self.text = text;
        self.parameters = parameters;
        self.handle = Some(handle);
        self.state = State::Prepared;
        Ok(())
    }

    /// Replace the bind parameters of a prepared statement.
    ///
    /// The replacement must fill exactly the placeholders of the compiled text.
    pub fn set_parameters(&mut self, parameters: Vec<Parameter>) -> Result<()> {
        self.handle()?;
        if parameters.len() != self.parameters.len() {
            return Err(Error::new(
                ErrorKind::ArgumentBadValue,
                format!(
                    "Expected {} parameters, {} were given",
                    self.parameters.len(),
                    parameters.len()
                ),
            ));
        }
        self.parameters = parameters;
        Ok(())
    }

    /// The driver handle, provided the statement is prepared and not yet closed.
    pub fn handle(&mut self) -> Result<&mut (dyn Prepared + 'static)> {
        match self.state {
            State::Unprepared => Err(Error::attribute_null("statement")),
            State::Closed => Err(Error::illegal_state("The statement is closed")),
            State::Prepared => self
                .handle
                .as_deref_mut()
                .ok_or_else(|| Error::attribute_null("statement")),
        }
    }

    /// Apply the query timeout and bind every parameter, returning the next free position.
    pub fn bind(&mut self) -> Result<usize> {
        let timeout = self.config.query_timeout();
        let parameters = std::mem::take(&mut self.parameters);
        let result = self.handle().and_then(|handle| {
            handle.set_query_timeout(timeout).map_err(driver_error)?;
            bind_parameters(handle, 0, &parameters)
        });
        self.parameters = parameters;
        result
    }

    /// Release the driver handle. Closing twice is a no op.
    pub fn close(&mut self) {
        if let Some(mut handle) = self.handle.take() {
            log_close_error(handle.close(), "prepared statement");
        }
        self.state = State::Closed;
    }
}

impl Display for StatementCore {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl Drop for StatementCore {
    fn drop(&mut self) {
        if self.handle.is_some() {
            self.close();
        }
    }
}

/// Bind `parameters` from position `start` using the binder of each declared type.
///
/// Null values are bound as typed SQL NULL. Returns the position following the last one bound.
pub fn bind_parameters(
    handle: &mut dyn Prepared,
    start: usize,
    parameters: &[Parameter],
) -> Result<usize> {
    let mut index = start;
    for parameter in parameters {
        bind_parameter(handle, index, parameter)?;
        index += 1;
    }
    Ok(index)
}

fn bind_parameter(handle: &mut dyn Prepared, index: usize, parameter: &Parameter) -> Result<()> {
    if parameter.is_null() {
        return handle
            .bind_null(index, parameter.ty)
            .map_err(driver_error);
    }
    let result = match parameter.ty {
        ParameterType::Boolean => match parameter.boolean_value()? {
            Some(v) => handle.bind_boolean(index, v),
            None => handle.bind_null(index, parameter.ty),
        },
        ParameterType::Integer => match parameter.integer_value()? {
            Some(v) => handle.bind_integer(index, v),
            None => handle.bind_null(index, parameter.ty),
        },
        ParameterType::Numeric => match parameter.long_value()? {
            Some(v) => handle.bind_long(index, v),
            None => handle.bind_null(index, parameter.ty),
        },
        ParameterType::Double => match parameter.double_value()? {
            Some(v) => handle.bind_double(index, v),
            None => handle.bind_null(index, parameter.ty),
        },
        ParameterType::Float => match parameter.float_value()? {
            Some(v) => handle.bind_float(index, v),
            None => handle.bind_null(index, parameter.ty),
        },
        ParameterType::Decimal => match parameter.decimal_value()? {
            Some(v) => handle.bind_decimal(index, v),
            None => handle.bind_null(index, parameter.ty),
        },
        ParameterType::Date => match parameter.date_value()? {
            Some(v) => handle.bind_date(index, v),
            None => handle.bind_null(index, parameter.ty),
        },
        ParameterType::Time => match parameter.time_value()? {
            Some(v) => handle.bind_time(index, v),
            None => handle.bind_null(index, parameter.ty),
        },
        ParameterType::Timestamp => match parameter.timestamp_value()? {
            Some(v) => handle.bind_timestamp(index, v),
            None => handle.bind_null(index, parameter.ty),
        },
        ParameterType::Varchar => match parameter.string_value()? {
            Some(v) => handle.bind_varchar(index, &v),
            None => handle.bind_null(index, parameter.ty),
        },
        ParameterType::Binary => match parameter.binary_value()? {
            Some(v) => handle.bind_binary(index, &v),
            None => handle.bind_null(index, parameter.ty),
        },
        ParameterType::Null => handle.bind_object(index, &parameter.value),
    };
    result.map_err(driver_error)
}

/// Read every row of `cursor`, one value per label. The cursor is closed on every path.
pub fn fetch_rows(mut cursor: Box<dyn Cursor>, labels: RowNames) -> Result<Vec<RowLabeled>> {
    let result = (|| -> Result<Vec<RowLabeled>> {
        let mut rows = Vec::new();
        while cursor.next().map_err(driver_error)? {
            let values = labels
                .iter()
                .map(|label| cursor.get(label).map_err(driver_error))
                .collect::<Result<Box<[Value]>>>()?;
            rows.push(RowLabeled::new(labels.clone(), values));
        }
        Ok(rows)
    })();
    log_close_error(cursor.close(), "cursor");
    result
}

/// A compiled SQL statement bound to a driver handle.
pub trait Statement {
    type Output;

    fn core(&self) -> &StatementCore;

    fn core_mut(&mut self) -> &mut StatementCore;

    /// Compile the statement and prepare it on `connection`. Allowed only once.
    fn prepare(&mut self, connection: &mut dyn Connection) -> Result<()>;

    /// Bind the parameters and run the prepared statement.
    fn execute(&mut self) -> Result<Self::Output>;

    /// Execute again with a different set of bind parameters.
    fn execute_with(&mut self, parameters: Vec<Parameter>) -> Result<Self::Output> {
        self.core_mut().set_parameters(parameters)?;
        self.execute()
    }

    fn close(&mut self) {
        self.core_mut().close();
    }

    /// Prepare, execute and close, the last step happens whatever the outcome.
    fn run(&mut self, connection: &mut dyn Connection) -> Result<Self::Output> {
        let result = self.prepare(connection).and_then(|_| self.execute());
        self.close();
        result
    }

    fn state(&self) -> State {
        self.core().state()
    }

    /// The compiled SQL, empty until prepared.
    fn text(&self) -> &str {
        self.core().text()
    }

    fn parameters(&self) -> &[Parameter] {
        self.core().parameters()
    }
}

macro_rules! impl_statement_display {
    ($($statement:ty),+ $(,)?) => {
        $(
            impl ::std::fmt::Display for $statement {
                fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                    ::std::fmt::Display::fmt($crate::Statement::core(self), f)
                }
            }
        )+
    };
}
pub(crate) use impl_statement_display;
