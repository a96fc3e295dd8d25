/// Host-provided functions exposed to guest programs. Dispatch lives in the
/// interpreter, which owns the standard streams they write to and read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Builtin {
    Print,
    Input,
    Throw,
}

impl Builtin {
    pub fn name(self) -> &'static str {
        match self {
            Self::Print => "print",
            Self::Input => "input",
            Self::Throw => "throw",
        }
    }

    pub fn all() -> [Self; 3] {
        [Self::Print, Self::Input, Self::Throw]
    }
}
