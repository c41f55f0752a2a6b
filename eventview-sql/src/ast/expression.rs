use std::fmt;

use derive_more::derive::From;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::{
    AstConversionError, Dialect, DialectDisplay, IntoDialect, TryFromDialect, TryIntoDialect,
    ast::*, fmt::fmt_with,
};

/// Infix operators
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BinaryOperator {
    And,
    Or,
    Equal,
    NotEqual,
    Greater,
    GreaterOrEqual,
    Less,
    LessOrEqual,
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Concat,
}

impl TryFrom<sqlparser::ast::BinaryOperator> for BinaryOperator {
    type Error = AstConversionError;

    fn try_from(value: sqlparser::ast::BinaryOperator) -> Result<Self, Self::Error> {
        use sqlparser::ast::BinaryOperator as BinOp;
        match value {
            BinOp::And => Ok(Self::And),
            BinOp::Or => Ok(Self::Or),
            BinOp::Eq => Ok(Self::Equal),
            BinOp::NotEq => Ok(Self::NotEqual),
            BinOp::Gt => Ok(Self::Greater),
            BinOp::GtEq => Ok(Self::GreaterOrEqual),
            BinOp::Lt => Ok(Self::Less),
            BinOp::LtEq => Ok(Self::LessOrEqual),
            BinOp::Plus => Ok(Self::Add),
            BinOp::Minus => Ok(Self::Subtract),
            BinOp::Multiply => Ok(Self::Multiply),
            BinOp::Divide => Ok(Self::Divide),
            BinOp::Modulo => Ok(Self::Modulo),
            BinOp::StringConcat => Ok(Self::Concat),
            _ => unsupported!("binary operator {value}"),
        }
    }
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match self {
            Self::And => "AND",
            Self::Or => "OR",
            Self::Equal => "=",
            Self::NotEqual => "<>",
            Self::Greater => ">",
            Self::GreaterOrEqual => ">=",
            Self::Less => "<",
            Self::LessOrEqual => "<=",
            Self::Add => "+",
            Self::Subtract => "-",
            Self::Multiply => "*",
            Self::Divide => "/",
            Self::Modulo => "%",
            Self::Concat => "||",
        };
        f.write_str(op)
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum UnaryOperator {
    Neg,
    Not,
}

impl TryFrom<sqlparser::ast::UnaryOperator> for UnaryOperator {
    type Error = AstConversionError;

    fn try_from(value: sqlparser::ast::UnaryOperator) -> Result<Self, Self::Error> {
        use sqlparser::ast::UnaryOperator as UnOp;
        match value {
            UnOp::Minus => Ok(Self::Neg),
            UnOp::Not => Ok(Self::Not),
            _ => unsupported!("unary operator {value}"),
        }
    }
}

impl fmt::Display for UnaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnaryOperator::Neg => write!(f, "-"),
            UnaryOperator::Not => write!(f, "NOT"),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CastStyle {
    /// `CAST(expr AS type)`
    Cast,
    /// `TRY_CAST(expr AS type)`
    TryCast,
    /// `expr::type`
    DoubleColon,
}

/// Right-hand side of IN
#[derive(Clone, Debug, Eq, Hash, PartialEq, PartialOrd, Ord, Serialize, Deserialize, From)]
pub enum InValue {
    List(Vec<Expr>),
    Subquery(Box<Query>),
}

impl DialectDisplay for InValue {
    fn display(&self, dialect: Dialect) -> impl fmt::Display + '_ {
        fmt_with(move |f| match self {
            InValue::List(exprs) => write!(f, "{}", exprs.display(dialect)),
            InValue::Subquery(query) => write!(f, "{}", query.display(dialect)),
        })
    }
}

#[derive(Clone, Debug, Eq, Hash, PartialEq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FunctionArgument {
    Expr(Expr),
    /// `*`, as in `count(*)`
    Wildcard,
}

impl DialectDisplay for FunctionArgument {
    fn display(&self, dialect: Dialect) -> impl fmt::Display + '_ {
        fmt_with(move |f| match self {
            FunctionArgument::Expr(expr) => write!(f, "{}", expr.display(dialect)),
            FunctionArgument::Wildcard => write!(f, "*"),
        })
    }
}

#[derive(Clone, Debug, Eq, Hash, PartialEq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FunctionArguments {
    pub distinct: bool,
    pub args: Vec<FunctionArgument>,
}

/// A call to a named function.
///
/// `arguments` is `None` for functions written without parentheses, like `current_date`.
#[derive(Clone, Debug, Eq, Hash, PartialEq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FunctionExpr {
    pub name: QualifiedName,
    pub arguments: Option<FunctionArguments>,
    /// Set for window function calls
    pub over: Option<WindowSpec>,
}

/// The `OVER (...)` clause of a window function call
#[derive(Clone, Debug, Eq, Hash, PartialEq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WindowSpec {
    pub partition_by: Vec<Expr>,
    pub order: Option<OrderClause>,
    /// The frame clause, such as `ROWS BETWEEN 1 PRECEDING AND CURRENT ROW`, kept as written
    pub frame: Option<String>,
}

impl TryFromDialect<sqlparser::ast::WindowType> for WindowSpec {
    fn try_from_dialect(
        value: sqlparser::ast::WindowType,
        dialect: Dialect,
    ) -> Result<Self, AstConversionError> {
        use sqlparser::ast::WindowType;
        match value {
            WindowType::WindowSpec(spec) => {
                if let Some(name) = spec.window_name {
                    return unsupported!("window {name} referenced from OVER (...)");
                }
                let order = if spec.order_by.is_empty() {
                    None
                } else {
                    Some(OrderClause {
                        order_by: spec.order_by.try_into_dialect(dialect)?,
                    })
                };
                Ok(Self {
                    partition_by: spec.partition_by.try_into_dialect(dialect)?,
                    order,
                    frame: spec.window_frame.map(|frame| match frame.end_bound {
                        Some(end_bound) => {
                            format!("{} BETWEEN {} AND {end_bound}", frame.units, frame.start_bound)
                        }
                        None => format!("{} {}", frame.units, frame.start_bound),
                    }),
                })
            }
            WindowType::NamedWindow(name) => unsupported!("named window {name}"),
            #[allow(unreachable_patterns)]
            _ => unsupported!("window {value}"),
        }
    }
}

impl DialectDisplay for WindowSpec {
    fn display(&self, dialect: Dialect) -> impl fmt::Display + '_ {
        fmt_with(move |f| {
            let mut parts = vec![];
            if !self.partition_by.is_empty() {
                parts.push(format!("PARTITION BY {}", self.partition_by.display(dialect)));
            }
            if let Some(order) = &self.order {
                parts.push(order.display(dialect).to_string());
            }
            if let Some(frame) = &self.frame {
                parts.push(frame.clone());
            }
            write!(f, "{}", parts.join(" "))
        })
    }
}

impl TryFromDialect<sqlparser::ast::FunctionArg> for FunctionArgument {
    fn try_from_dialect(
        value: sqlparser::ast::FunctionArg,
        dialect: Dialect,
    ) -> Result<Self, AstConversionError> {
        use sqlparser::ast::{FunctionArg, FunctionArgExpr};
        match value {
            FunctionArg::Unnamed(FunctionArgExpr::Expr(expr)) => {
                Ok(Self::Expr(expr.try_into_dialect(dialect)?))
            }
            FunctionArg::Unnamed(FunctionArgExpr::Wildcard) => Ok(Self::Wildcard),
            _ => unsupported!("function argument {value}"),
        }
    }
}

impl TryFromDialect<sqlparser::ast::Function> for FunctionExpr {
    fn try_from_dialect(
        value: sqlparser::ast::Function,
        dialect: Dialect,
    ) -> Result<Self, AstConversionError> {
        use sqlparser::ast::{DuplicateTreatment, FunctionArguments as Args};
        if value.filter.is_some() || value.null_treatment.is_some() {
            return unsupported!("aggregate modifiers in {value}");
        }
        if !value.within_group.is_empty() || !matches!(value.parameters, Args::None) {
            return unsupported!("function parameters in {value}");
        }
        let sqlparser::ast::Function {
            name, args, over, ..
        } = value;
        let arguments = match args {
            Args::None => None,
            Args::List(list) => {
                if !list.clauses.is_empty() {
                    return unsupported!("function argument clauses in call to {name}");
                }
                Some(FunctionArguments {
                    distinct: matches!(list.duplicate_treatment, Some(DuplicateTreatment::Distinct)),
                    args: list.args.try_into_dialect(dialect)?,
                })
            }
            Args::Subquery(_) => return unsupported!("subquery as argument list of {name}"),
        };
        Ok(Self {
            name: name.try_into_dialect(dialect)?,
            arguments,
            over: over.try_into_dialect(dialect)?,
        })
    }
}

impl DialectDisplay for FunctionExpr {
    fn display(&self, dialect: Dialect) -> impl fmt::Display + '_ {
        fmt_with(move |f| {
            write!(f, "{}", self.name.display(dialect))?;
            if let Some(arguments) = &self.arguments {
                write!(f, "(")?;
                if arguments.distinct {
                    write!(f, "DISTINCT ")?;
                }
                write!(f, "{})", arguments.args.display(dialect))?;
            }
            if let Some(over) = &self.over {
                write!(f, " OVER ({})", over.display(dialect))?;
            }
            Ok(())
        })
    }
}

/// One `WHEN condition THEN body` arm of a `CASE` expression
#[derive(Clone, Debug, Eq, Hash, PartialEq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CaseWhenBranch {
    pub condition: Expr,
    pub body: Expr,
}

impl TryFromDialect<sqlparser::ast::CaseWhen> for CaseWhenBranch {
    fn try_from_dialect(
        value: sqlparser::ast::CaseWhen,
        dialect: Dialect,
    ) -> Result<Self, AstConversionError> {
        Ok(Self {
            condition: value.condition.try_into_dialect(dialect)?,
            body: value.result.try_into_dialect(dialect)?,
        })
    }
}

/// `INTERVAL value [leading_field [(precision)] [TO last_field [(precision)]]]`
///
/// Field names are kept as written, since nothing inspects them.
#[derive(Clone, Debug, Eq, Hash, PartialEq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct IntervalExpr {
    pub value: Box<Expr>,
    pub leading_field: Option<String>,
    pub leading_precision: Option<u64>,
    pub last_field: Option<String>,
    pub fractional_seconds_precision: Option<u64>,
}

impl TryFromDialect<sqlparser::ast::Interval> for IntervalExpr {
    fn try_from_dialect(
        value: sqlparser::ast::Interval,
        dialect: Dialect,
    ) -> Result<Self, AstConversionError> {
        let sqlparser::ast::Interval {
            value,
            leading_field,
            leading_precision,
            last_field,
            fractional_seconds_precision,
            ..
        } = value;
        if fractional_seconds_precision.is_some() && last_field.is_none() {
            return unsupported!("INTERVAL ... SECOND (precision, fractional precision)");
        }
        Ok(Self {
            value: value.try_into_dialect(dialect)?,
            leading_field: leading_field.map(|field| field.to_string()),
            leading_precision,
            last_field: last_field.map(|field| field.to_string()),
            fractional_seconds_precision,
        })
    }
}

impl DialectDisplay for IntervalExpr {
    fn display(&self, dialect: Dialect) -> impl fmt::Display + '_ {
        fmt_with(move |f| {
            write!(f, "(INTERVAL {}", self.value.display(dialect))?;
            if let Some(field) = &self.leading_field {
                write!(f, " {field}")?;
            }
            if let Some(precision) = self.leading_precision {
                write!(f, " ({precision})")?;
            }
            if let Some(field) = &self.last_field {
                write!(f, " TO {field}")?;
            }
            if let Some(precision) = self.fractional_seconds_precision {
                write!(f, " ({precision})")?;
            }
            write!(f, ")")
        })
    }
}

/// The `ESCAPE` operand of `LIKE`; older `sqlparser` releases carried it as a bare string or
/// character rather than a value
trait LikeEscape {
    fn into_escape(self) -> Result<String, AstConversionError>;
}

impl LikeEscape for sqlparser::ast::Value {
    fn into_escape(self) -> Result<String, AstConversionError> {
        match Literal::try_from(self)? {
            Literal::String(s) => Ok(s),
            other => unsupported!("LIKE escape {other:?}"),
        }
    }
}

impl LikeEscape for String {
    fn into_escape(self) -> Result<String, AstConversionError> {
        Ok(self)
    }
}

impl LikeEscape for char {
    fn into_escape(self) -> Result<String, AstConversionError> {
        Ok(self.to_string())
    }
}

fn like_escape<E: LikeEscape>(escape: Option<E>) -> Result<Option<String>, AstConversionError> {
    escape.map(LikeEscape::into_escape).transpose()
}

/// SQL value expressions
#[derive(Clone, Debug, Eq, Hash, PartialEq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Expr {
    Literal(Literal),

    /// A bare name, such as a column with no qualifier
    Identifier(SqlIdentifier),

    /// Field access on another expression: `base.field`.
    ///
    /// A qualified column like `e.type` is a dereference of the identifier `e`.
    Dereference {
        base: Box<Expr>,
        field: SqlIdentifier,
    },

    BinaryOp {
        lhs: Box<Expr>,
        op: BinaryOperator,
        rhs: Box<Expr>,
    },

    UnaryOp {
        op: UnaryOperator,
        rhs: Box<Expr>,
    },

    /// `operand [NOT] BETWEEN min AND max`
    Between {
        operand: Box<Expr>,
        min: Box<Expr>,
        max: Box<Expr>,
        negated: bool,
    },

    /// `lhs [NOT] IN (...)`
    In {
        lhs: Box<Expr>,
        rhs: InValue,
        negated: bool,
    },

    /// `expr IS [NOT] NULL`
    IsNull {
        expr: Box<Expr>,
        negated: bool,
    },

    /// `expr [NOT] LIKE pattern [ESCAPE 'c']`, or `ILIKE` when `case_insensitive` is set
    Like {
        expr: Box<Expr>,
        pattern: Box<Expr>,
        negated: bool,
        case_insensitive: bool,
        escape: Option<String>,
    },

    /// `CASE [operand] WHEN ... THEN ... [ELSE ...] END`
    Case {
        operand: Option<Box<Expr>>,
        branches: Vec<CaseWhenBranch>,
        else_expr: Option<Box<Expr>>,
    },

    Interval(IntervalExpr),

    /// `EXISTS (query)`; `NOT EXISTS` is a negation of this
    Exists(Box<Query>),

    /// A scalar subquery
    Subquery(Box<Query>),

    Call(FunctionExpr),

    Cast {
        expr: Box<Expr>,
        ty: String,
        style: CastStyle,
    },

    /// `ARRAY[...]`
    Array(Vec<Expr>),

    /// A row constructor: `(a, b, ...)`
    Row(Vec<Expr>),
}

impl Expr {
    /// `base.field` where `base` is a bare identifier
    pub fn dereference(base: impl Into<SqlIdentifier>, field: impl Into<SqlIdentifier>) -> Self {
        Expr::Dereference {
            base: Box::new(Expr::Identifier(base.into())),
            field: field.into(),
        }
    }

    pub fn and(self, rhs: Expr) -> Self {
        Expr::BinaryOp {
            lhs: Box::new(self),
            op: BinaryOperator::And,
            rhs: Box::new(rhs),
        }
    }
}

impl From<Literal> for Expr {
    fn from(literal: Literal) -> Self {
        Expr::Literal(literal)
    }
}

fn compound_identifier(idents: Vec<sqlparser::ast::Ident>, dialect: Dialect) -> Option<Expr> {
    let mut idents = idents.into_iter();
    let first = Expr::Identifier(idents.next()?.into_dialect(dialect));
    Some(idents.fold(first, |base, field| Expr::Dereference {
        base: Box::new(base),
        field: field.into_dialect(dialect),
    }))
}

fn typed_string<V>(data_type: sqlparser::ast::DataType, value: V) -> Result<Expr, AstConversionError>
where
    V: TryInto<Literal, Error = AstConversionError>,
{
    match value.try_into()? {
        Literal::String(value) => Ok(Expr::Literal(Literal::Typed {
            data_type: data_type.to_string(),
            value,
        })),
        other => failed!("typed literal with non-string value {other:?}"),
    }
}

impl TryFromDialect<sqlparser::ast::Expr> for Expr {
    fn try_from_dialect(
        value: sqlparser::ast::Expr,
        dialect: Dialect,
    ) -> Result<Self, AstConversionError> {
        use sqlparser::ast::Expr::*;
        match value {
            Identifier(ident) => Ok(Self::Identifier(ident.into_dialect(dialect))),
            CompoundIdentifier(idents) => compound_identifier(idents, dialect)
                .ok_or_else(|| failed_err!("empty compound identifier")),
            Value(value) => Ok(Self::Literal(value.try_into()?)),
            TypedString {
                data_type, value, ..
            } => typed_string(data_type, value),
            Nested(expr) => (*expr).try_into_dialect(dialect),
            BinaryOp { left, op, right } => Ok(Self::BinaryOp {
                lhs: left.try_into_dialect(dialect)?,
                op: op.try_into()?,
                rhs: right.try_into_dialect(dialect)?,
            }),
            UnaryOp { op, expr } => Ok(Self::UnaryOp {
                op: op.try_into()?,
                rhs: expr.try_into_dialect(dialect)?,
            }),
            Between {
                expr,
                negated,
                low,
                high,
            } => Ok(Self::Between {
                operand: expr.try_into_dialect(dialect)?,
                min: low.try_into_dialect(dialect)?,
                max: high.try_into_dialect(dialect)?,
                negated,
            }),
            InList {
                expr,
                list,
                negated,
            } => Ok(Self::In {
                lhs: expr.try_into_dialect(dialect)?,
                rhs: InValue::List(list.try_into_dialect(dialect)?),
                negated,
            }),
            InSubquery {
                expr,
                subquery,
                negated,
            } => Ok(Self::In {
                lhs: expr.try_into_dialect(dialect)?,
                rhs: InValue::Subquery(subquery.try_into_dialect(dialect)?),
                negated,
            }),
            IsNull(expr) => Ok(Self::IsNull {
                expr: expr.try_into_dialect(dialect)?,
                negated: false,
            }),
            IsNotNull(expr) => Ok(Self::IsNull {
                expr: expr.try_into_dialect(dialect)?,
                negated: true,
            }),
            Like { any: true, .. } | ILike { any: true, .. } => unsupported!("LIKE ANY"),
            Like {
                negated,
                expr,
                pattern,
                escape_char,
                ..
            } => Ok(Self::Like {
                expr: expr.try_into_dialect(dialect)?,
                pattern: pattern.try_into_dialect(dialect)?,
                negated,
                case_insensitive: false,
                escape: like_escape(escape_char)?,
            }),
            ILike {
                negated,
                expr,
                pattern,
                escape_char,
                ..
            } => Ok(Self::Like {
                expr: expr.try_into_dialect(dialect)?,
                pattern: pattern.try_into_dialect(dialect)?,
                negated,
                case_insensitive: true,
                escape: like_escape(escape_char)?,
            }),
            Exists { subquery, negated } => {
                let exists = Self::Exists(subquery.try_into_dialect(dialect)?);
                if negated {
                    Ok(Self::UnaryOp {
                        op: crate::ast::UnaryOperator::Not,
                        rhs: Box::new(exists),
                    })
                } else {
                    Ok(exists)
                }
            }
            Subquery(query) => Ok(Self::Subquery(query.try_into_dialect(dialect)?)),
            Function(function) => Ok(Self::Call(function.try_into_dialect(dialect)?)),
            Cast {
                kind,
                expr,
                data_type,
                format,
                ..
            } => {
                use sqlparser::ast::CastKind;
                if format.is_some() {
                    return unsupported!("CAST with FORMAT");
                }
                let style = match kind {
                    CastKind::Cast => CastStyle::Cast,
                    CastKind::TryCast => CastStyle::TryCast,
                    CastKind::DoubleColon => CastStyle::DoubleColon,
                    CastKind::SafeCast => return unsupported!("SAFE_CAST"),
                };
                Ok(Self::Cast {
                    expr: expr.try_into_dialect(dialect)?,
                    ty: data_type.to_string(),
                    style,
                })
            }
            Array(array) => Ok(Self::Array(array.elem.try_into_dialect(dialect)?)),
            Tuple(exprs) => Ok(Self::Row(exprs.try_into_dialect(dialect)?)),
            Case {
                operand,
                conditions,
                else_result,
                ..
            } => Ok(Self::Case {
                operand: operand.try_into_dialect(dialect)?,
                branches: conditions.try_into_dialect(dialect)?,
                else_expr: else_result.try_into_dialect(dialect)?,
            }),
            Interval(interval) => Ok(Self::Interval(interval.try_into_dialect(dialect)?)),
            _ => unsupported!("expression {value}"),
        }
    }
}

impl DialectDisplay for Expr {
    fn display(&self, dialect: Dialect) -> impl fmt::Display + '_ {
        fmt_with(move |f| match self {
            Expr::Literal(literal) => write!(f, "{}", literal.display(dialect)),
            Expr::Identifier(ident) => write!(f, "{}", ident.display(dialect)),
            Expr::Dereference { base, field } => {
                write!(f, "{}.{}", base.display(dialect), field.display(dialect))
            }
            Expr::BinaryOp { lhs, op, rhs } => write!(
                f,
                "({} {op} {})",
                lhs.display(dialect),
                rhs.display(dialect)
            ),
            Expr::UnaryOp { op, rhs } => write!(f, "({op} {})", rhs.display(dialect)),
            Expr::Between {
                operand,
                min,
                max,
                negated,
            } => write!(
                f,
                "({} {}BETWEEN {} AND {})",
                operand.display(dialect),
                if *negated { "NOT " } else { "" },
                min.display(dialect),
                max.display(dialect)
            ),
            Expr::In { lhs, rhs, negated } => write!(
                f,
                "({} {}IN ({}))",
                lhs.display(dialect),
                if *negated { "NOT " } else { "" },
                rhs.display(dialect)
            ),
            Expr::IsNull { expr, negated } => write!(
                f,
                "({} IS {}NULL)",
                expr.display(dialect),
                if *negated { "NOT " } else { "" }
            ),
            Expr::Like {
                expr,
                pattern,
                negated,
                case_insensitive,
                escape,
            } => {
                write!(
                    f,
                    "({} {}{} {}",
                    expr.display(dialect),
                    if *negated { "NOT " } else { "" },
                    if *case_insensitive { "ILIKE" } else { "LIKE" },
                    pattern.display(dialect)
                )?;
                if let Some(escape) = escape {
                    write!(f, " ESCAPE {}", quote_string(escape, dialect))?;
                }
                write!(f, ")")
            }
            Expr::Case {
                operand,
                branches,
                else_expr,
            } => {
                write!(f, "CASE")?;
                if let Some(operand) = operand {
                    write!(f, " {}", operand.display(dialect))?;
                }
                for branch in branches {
                    write!(
                        f,
                        " WHEN {} THEN {}",
                        branch.condition.display(dialect),
                        branch.body.display(dialect)
                    )?;
                }
                if let Some(else_expr) = else_expr {
                    write!(f, " ELSE {}", else_expr.display(dialect))?;
                }
                write!(f, " END")
            }
            Expr::Interval(interval) => write!(f, "{}", interval.display(dialect)),
            Expr::Exists(query) => write!(f, "EXISTS ({})", query.display(dialect)),
            Expr::Subquery(query) => write!(f, "({})", query.display(dialect)),
            Expr::Call(function) => write!(f, "{}", function.display(dialect)),
            Expr::Cast { expr, ty, style } => match style {
                CastStyle::Cast => write!(f, "CAST({} AS {ty})", expr.display(dialect)),
                CastStyle::TryCast => write!(f, "TRY_CAST({} AS {ty})", expr.display(dialect)),
                CastStyle::DoubleColon => write!(f, "({}::{ty})", expr.display(dialect)),
            },
            Expr::Array(exprs) => write!(f, "ARRAY[{}]", exprs.display(dialect)),
            Expr::Row(exprs) => write!(
                f,
                "({})",
                exprs.iter().map(|expr| expr.display(dialect)).join(", ")
            ),
        })
    }
}
