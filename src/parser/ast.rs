// AST (Abstract Syntax Tree) definitions for the script language

use rustc_hash::FxHashSet;
use std::rc::Rc;

/// Source location information for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

impl SourceLocation {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    FloorDiv,
    Mod,
    Pow,
    // Comparison
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    In,
    NotIn,
    Is,
    IsNot,
    // Logical (short-circuit, yield an operand)
    And,
    Or,
}

impl BinOp {
    /// Operator spelling as it appears in source, used in error messages
    pub fn symbol(self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::FloorDiv => "//",
            BinOp::Mod => "%",
            BinOp::Pow => "**",
            BinOp::Eq => "==",
            BinOp::Ne => "!=",
            BinOp::Lt => "<",
            BinOp::Le => "<=",
            BinOp::Gt => ">",
            BinOp::Ge => ">=",
            BinOp::In => "in",
            BinOp::NotIn => "not in",
            BinOp::Is => "is",
            BinOp::IsNot => "is not",
            BinOp::And => "and",
            BinOp::Or => "or",
        }
    }
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnOp {
    Neg,
    Pos,
    Not,
}

/// Expression nodes
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    IntLiteral(i64, SourceLocation),
    FloatLiteral(f64, SourceLocation),
    StringLiteral(String, SourceLocation),
    BoolLiteral(bool, SourceLocation),
    NoneLiteral(SourceLocation),
    Variable(String, SourceLocation),
    List {
        items: Vec<Expr>,
        location: SourceLocation,
    },
    Dict {
        entries: Vec<(Expr, Expr)>,
        location: SourceLocation,
    },
    BinaryOp {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
        location: SourceLocation,
    },
    /// Chained comparison: `a < b <= c` means `a < b and b <= c`
    Compare {
        first: Box<Expr>,
        rest: Vec<(BinOp, Expr)>,
        location: SourceLocation,
    },
    UnaryOp {
        op: UnOp,
        operand: Box<Expr>,
        location: SourceLocation,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
        kwargs: Vec<(String, Expr)>,
        location: SourceLocation,
    },
    Index {
        target: Box<Expr>,
        index: Box<Expr>,
        location: SourceLocation,
    },
    Attribute {
        target: Box<Expr>,
        name: String,
        location: SourceLocation,
    },
}

impl Expr {
    pub fn location(&self) -> SourceLocation {
        match self {
            Expr::IntLiteral(_, loc)
            | Expr::FloatLiteral(_, loc)
            | Expr::StringLiteral(_, loc)
            | Expr::BoolLiteral(_, loc)
            | Expr::NoneLiteral(loc)
            | Expr::Variable(_, loc) => *loc,
            Expr::List { location, .. }
            | Expr::Dict { location, .. }
            | Expr::BinaryOp { location, .. }
            | Expr::Compare { location, .. }
            | Expr::UnaryOp { location, .. }
            | Expr::Call { location, .. }
            | Expr::Index { location, .. }
            | Expr::Attribute { location, .. } => *location,
        }
    }
}

/// Left-hand side of an assignment
#[derive(Debug, Clone, PartialEq)]
pub enum AssignTarget {
    Name(String),
    Index { target: Expr, index: Expr },
}

/// One `if` / `elif` arm
#[derive(Debug, Clone, PartialEq)]
pub struct CondBranch {
    pub condition: Expr,
    pub body: Vec<Stmt>,
    pub location: SourceLocation,
}

/// Statement nodes
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Expression {
        expr: Expr,
        location: SourceLocation,
    },
    Assign {
        target: AssignTarget,
        value: Expr,
        location: SourceLocation,
    },
    AugAssign {
        target: AssignTarget,
        op: BinOp,
        value: Expr,
        location: SourceLocation,
    },
    If {
        branches: Vec<CondBranch>,
        else_branch: Option<Vec<Stmt>>,
        location: SourceLocation,
    },
    While {
        condition: Expr,
        body: Vec<Stmt>,
        location: SourceLocation,
    },
    For {
        var: String,
        iterable: Expr,
        body: Vec<Stmt>,
        location: SourceLocation,
    },
    FunctionDef(Rc<FunctionDef>),
    Return {
        value: Option<Expr>,
        location: SourceLocation,
    },
    Break {
        location: SourceLocation,
    },
    Continue {
        location: SourceLocation,
    },
    Pass {
        location: SourceLocation,
    },
    Global {
        names: Vec<String>,
        location: SourceLocation,
    },
}

impl Stmt {
    pub fn location(&self) -> SourceLocation {
        match self {
            Stmt::FunctionDef(def) => def.location,
            Stmt::Expression { location, .. }
            | Stmt::Assign { location, .. }
            | Stmt::AugAssign { location, .. }
            | Stmt::If { location, .. }
            | Stmt::While { location, .. }
            | Stmt::For { location, .. }
            | Stmt::Return { location, .. }
            | Stmt::Break { location }
            | Stmt::Continue { location }
            | Stmt::Pass { location }
            | Stmt::Global { location, .. } => *location,
        }
    }
}

/// A user-defined function
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDef {
    pub name: String,
    pub params: Vec<String>,
    pub body: Vec<Stmt>,
    /// Names bound in the function's own frame (parameters plus assigned
    /// names not declared `global`)
    pub locals: FxHashSet<String>,
    pub location: SourceLocation,
}

impl FunctionDef {
    pub fn is_local(&self, name: &str) -> bool {
        self.locals.contains(name)
    }
}

/// Compiled program: top-level statements plus the source text they came from
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    pub body: Vec<Stmt>,
    pub source_lines: Vec<String>,
}

impl Program {
    pub fn new(body: Vec<Stmt>, source: &str) -> Self {
        Program {
            body,
            source_lines: source.lines().map(str::to_string).collect(),
        }
    }

    /// Source text of a 1-based line, without surrounding whitespace
    pub fn line_text(&self, line: usize) -> Option<&str> {
        line.checked_sub(1)
            .and_then(|idx| self.source_lines.get(idx))
            .map(|l| l.trim())
    }
}
