//! C++ spellings of Clove types and class-derived names.

use clove_ir::{Name, StringInterner, Ty};

use crate::EmitOptions;

/// Classes the runtime library provides.
fn is_runtime_class(name: Name) -> bool {
    matches!(name, Name::OBJECT | Name::STRING | Name::CLASS)
}

/// Name spelling shared by the header and body printers.
#[derive(Copy, Clone)]
pub(crate) struct Spelling<'a> {
    pub interner: &'a StringInterner,
    pub options: &'a EmitOptions,
}

impl<'a> Spelling<'a> {
    pub fn new(interner: &'a StringInterner, options: &'a EmitOptions) -> Self {
        Spelling { interner, options }
    }

    pub fn name(&self, name: Name) -> &'static str {
        self.interner.lookup(name)
    }

    fn runtime(&self) -> &str {
        &self.options.runtime
    }

    /// Smart-pointer typedef used for values of the class: `Dog`.
    pub fn class_ref(&self, class: Name) -> String {
        if is_runtime_class(class) {
            format!("{}::{}", self.runtime(), self.name(class))
        } else {
            self.name(class).to_owned()
        }
    }

    /// Data layout struct: `__Dog`.
    pub fn struct_name(&self, class: Name) -> String {
        if is_runtime_class(class) {
            format!("{}::__{}", self.runtime(), self.name(class))
        } else {
            format!("__{}", self.name(class))
        }
    }

    /// Vtable struct: `__Dog_VT`.
    pub fn vtable_name(&self, class: Name) -> String {
        format!("{}_VT", self.struct_name(class))
    }

    pub fn ty(&self, ty: &Ty) -> String {
        match ty {
            Ty::Void => "void".to_owned(),
            Ty::Boolean => "bool".to_owned(),
            Ty::Byte => "int8_t".to_owned(),
            Ty::Char => "char".to_owned(),
            Ty::Short => "int16_t".to_owned(),
            Ty::Int => "int32_t".to_owned(),
            Ty::Long => "int64_t".to_owned(),
            Ty::Float => "float".to_owned(),
            Ty::Double => "double".to_owned(),
            Ty::Class(class) => self.class_ref(*class),
            Ty::Array(elem) => format!("{}::Array<{}>", self.runtime(), self.ty(elem)),
            Ty::Null => self.class_ref(Name::OBJECT),
        }
    }

    /// `__rt::__Array<T>`, the struct behind an array of `elem`.
    pub fn array_struct(&self, elem: &Ty) -> String {
        format!("{}::__Array<{}>", self.runtime(), self.ty(elem))
    }

    /// `__rt::name`
    pub fn runtime_fn(&self, name: &str) -> String {
        format!("{}::{name}", self.runtime())
    }
}

/// Escape `text` for a C++ literal delimited by `quote`.
pub(crate) fn escape(text: &str, quote: char) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\0' => out.push_str("\\0"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if c.is_control() => out.push_str(&format!("\\x{:02x}", u32::from(c))),
            c => out.push(c),
        }
    }
    out
}
