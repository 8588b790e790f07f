use std::fmt;
use std::str::FromStr;

/// Whether a procedure reads or writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcedureKind {
    Query,
    Mutation,
}

impl fmt::Display for ProcedureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcedureKind::Query => f.write_str("query"),
            ProcedureKind::Mutation => f.write_str("mutation"),
        }
    }
}

/// Every operation exposed over RPC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Procedure {
    PostCreate,
    PostGetAll,
    PostGetBySlug,
    PostGetById,
    PostUpdate,
    PostDelete,
    CategoryCreate,
    CategoryGetAll,
    CategoryGetBySlug,
    CategoryUpdate,
    CategoryDelete,
}

impl Procedure {
    pub const ALL: [Procedure; 11] = [
        Procedure::PostCreate,
        Procedure::PostGetAll,
        Procedure::PostGetBySlug,
        Procedure::PostGetById,
        Procedure::PostUpdate,
        Procedure::PostDelete,
        Procedure::CategoryCreate,
        Procedure::CategoryGetAll,
        Procedure::CategoryGetBySlug,
        Procedure::CategoryUpdate,
        Procedure::CategoryDelete,
    ];

    /// Dotted path used in URLs and logs.
    pub fn path(self) -> &'static str {
        match self {
            Procedure::PostCreate => "post.create",
            Procedure::PostGetAll => "post.getAll",
            Procedure::PostGetBySlug => "post.getBySlug",
            Procedure::PostGetById => "post.getById",
            Procedure::PostUpdate => "post.update",
            Procedure::PostDelete => "post.delete",
            Procedure::CategoryCreate => "category.create",
            Procedure::CategoryGetAll => "category.getAll",
            Procedure::CategoryGetBySlug => "category.getBySlug",
            Procedure::CategoryUpdate => "category.update",
            Procedure::CategoryDelete => "category.delete",
        }
    }

    pub fn kind(self) -> ProcedureKind {
        match self {
            Procedure::PostGetAll
            | Procedure::PostGetBySlug
            | Procedure::PostGetById
            | Procedure::CategoryGetAll
            | Procedure::CategoryGetBySlug => ProcedureKind::Query,
            Procedure::PostCreate
            | Procedure::PostUpdate
            | Procedure::PostDelete
            | Procedure::CategoryCreate
            | Procedure::CategoryUpdate
            | Procedure::CategoryDelete => ProcedureKind::Mutation,
        }
    }
}

/// A path that names no procedure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownProcedure(pub String);

impl fmt::Display for UnknownProcedure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "No procedure named `{}`", self.0)
    }
}

impl FromStr for Procedure {
    type Err = UnknownProcedure;

    fn from_str(path: &str) -> Result<Self, Self::Err> {
        Procedure::ALL
            .into_iter()
            .find(|p| p.path() == path)
            .ok_or_else(|| UnknownProcedure(path.to_string()))
    }
}
