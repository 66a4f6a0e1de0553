pub mod document;

pub use document::{
    Block, Cell, Document, LineBreak, LinkStyle, Paragraph, PreKind, Row, Run, Table,
    plain_content, push_run,
};
