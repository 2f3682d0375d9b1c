pub mod assembler;
pub mod callgraph;
pub mod calls;
pub mod filesystem;
pub mod guards;
pub mod javascript;
pub mod pipeline;
pub mod python;
pub mod shell;
pub mod symbols;
