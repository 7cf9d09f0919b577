//! Header and body text for one lowered unit.

use std::path::{Path, PathBuf};

use clove_ir::{
    ClassLayout, DataMember, LoweredMethod, LoweredUnit, MemberInit, MethodKind, Name,
    StringInterner, VtableSlot,
};

use crate::code::CodePrinter;
use crate::emitter::{Emitter, StringEmitter};
use crate::names::{escape, Spelling};
use crate::EmitOptions;

/// Generated C++ for one unit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EmittedUnit {
    /// Source path of the unit.
    pub path: PathBuf,
    /// File name the body includes the header under, e.g. `Zoo.h`.
    pub header_name: String,
    pub header: String,
    pub body: String,
}

pub(crate) struct UnitPrinter<'a> {
    unit: &'a LoweredUnit,
    names: Spelling<'a>,
    code: CodePrinter<'a>,
    options: &'a EmitOptions,
}

impl<'a> UnitPrinter<'a> {
    pub fn new(unit: &'a LoweredUnit, interner: &'a StringInterner, options: &'a EmitOptions) -> Self {
        let names = Spelling::new(interner, options);
        UnitPrinter {
            unit,
            names,
            code: CodePrinter::new(&unit.arena, names),
            options,
        }
    }

    fn emitter(&self) -> StringEmitter {
        StringEmitter::with_capacity(self.options.indent_width, 4096)
    }

    fn open_namespaces(&self, out: &mut StringEmitter) {
        if !self.options.namespaces {
            return;
        }
        for segment in &self.unit.package {
            out.emit("namespace ");
            out.emit(self.names.name(*segment));
            out.emit(" {");
            out.emit_newline();
        }
        if !self.unit.package.is_empty() {
            out.emit_newline();
        }
    }

    fn close_namespaces(&self, out: &mut StringEmitter) {
        if !self.options.namespaces {
            return;
        }
        for segment in self.unit.package.iter().rev() {
            out.emit("} // namespace ");
            out.emit(self.names.name(*segment));
            out.emit_newline();
        }
    }

    /// `zoo::` prefix for references from outside the namespaces.
    fn package_prefix(&self) -> String {
        if !self.options.namespaces {
            return String::new();
        }
        self.unit
            .package
            .iter()
            .map(|segment| format!("{}::", self.names.name(*segment)))
            .collect()
    }

    // Header

    pub fn header(&self) -> String {
        let mut out = self.emitter();
        out.emit("#pragma once");
        out.emit_newline();
        out.emit_newline();
        out.emit("#include \"");
        out.emit(&self.options.runtime_header);
        out.emit("\"");
        out.emit_newline();
        for import in &self.unit.imports {
            out.emit(&format!("#include \"{}\"", header_name(import)));
            out.emit_newline();
        }
        out.emit_newline();
        self.open_namespaces(&mut out);

        for class in &self.unit.classes {
            self.forward_decls(class, &mut out);
        }
        for class in &self.unit.classes {
            out.emit_newline();
            self.data_struct(class, &mut out);
            out.emit_newline();
            self.vtable_struct(class, &mut out);
        }

        out.emit_newline();
        self.close_namespaces(&mut out);
        out.trim_trailing_blank_lines();
        out.ensure_trailing_newline();
        out.output()
    }

    fn forward_decls(&self, class: &ClassLayout, out: &mut StringEmitter) {
        let data = self.names.struct_name(class.name);
        out.emit(&format!("struct {data};"));
        out.emit_newline();
        out.emit(&format!("struct {};", self.names.vtable_name(class.name)));
        out.emit_newline();
        out.emit(&format!(
            "typedef {}::Ptr<{data}> {};",
            self.options.runtime,
            self.names.class_ref(class.name)
        ));
        out.emit_newline();
    }

    fn data_struct(&self, class: &ClassLayout, out: &mut StringEmitter) {
        let data = self.names.struct_name(class.name);
        out.emit(&format!("struct {data} {{"));
        out.emit_newline();
        for member in &class.data {
            out.emit_indent(1);
            match member {
                DataMember::VtablePtr => {
                    out.emit(&format!("{}* __vptr;", self.names.vtable_name(class.name)));
                }
                DataMember::Field { name, ty, .. } => {
                    out.emit(&format!("{} {};", self.names.ty(ty), self.names.name(*name)));
                }
            }
            out.emit_newline();
        }
        out.emit_newline();
        out.emit_indent(1);
        out.emit(&format!("{data}();"));
        out.emit_newline();

        if !class.statics.is_empty() {
            out.emit_newline();
            for storage in &class.statics {
                out.emit_indent(1);
                out.emit(&format!(
                    "static {} {};",
                    self.names.ty(&storage.ty),
                    self.names.name(storage.name)
                ));
                out.emit_newline();
            }
        }

        out.emit_newline();
        for method in class.init_routines.iter().chain(&class.methods) {
            out.emit_indent(1);
            out.emit("static ");
            out.emit(&self.signature(method, None));
            out.emit(";");
            out.emit_newline();
        }

        out.emit_newline();
        out.emit_indent(1);
        out.emit(&format!("static {} __class();", self.names.class_ref(Name::CLASS)));
        out.emit_newline();
        out.emit_indent(1);
        out.emit(&format!("static {} __vtable;", self.names.vtable_name(class.name)));
        out.emit_newline();
        out.emit("};");
        out.emit_newline();
    }

    fn vtable_struct(&self, class: &ClassLayout, out: &mut StringEmitter) {
        let vt = self.names.vtable_name(class.name);
        out.emit(&format!("struct {vt} {{"));
        out.emit_newline();
        out.emit_indent(1);
        out.emit(&format!("{} __is_a;", self.names.class_ref(Name::CLASS)));
        out.emit_newline();
        for slot in &class.vtable.slots {
            out.emit_indent(1);
            out.emit(&format!(
                "{} (*{})({});",
                self.names.ty(&slot.ret),
                self.names.name(slot.name),
                self.slot_params(slot)
            ));
            out.emit_newline();
        }

        out.emit_newline();
        out.emit_indent(1);
        out.emit(&format!("{vt}()"));
        out.emit_newline();
        out.emit_indent(2);
        out.emit(&format!(
            ": __is_a({}::__class())",
            self.names.struct_name(class.name)
        ));
        for binding in &class.vtable_init.bindings {
            out.emit(",");
            out.emit_newline();
            out.emit_indent(2);
            out.emit("  ");
            out.emit(self.names.name(binding.slot));
            out.emit("(");
            if binding.needs_cast {
                if let Some(slot) = class.vtable.slot(binding.slot) {
                    out.emit(&format!(
                        "({}(*)({})) ",
                        self.names.ty(&slot.ret),
                        self.slot_params(slot)
                    ));
                }
            }
            out.emit(&format!(
                "&{}::{}",
                self.names.struct_name(binding.owner),
                self.names.name(binding.impl_name)
            ));
            out.emit(")");
        }
        out.emit(" {}");
        out.emit_newline();
        out.emit("};");
        out.emit_newline();
    }

    /// Receiver typed as the introducing class, then the declared parameters.
    fn slot_params(&self, slot: &VtableSlot) -> String {
        std::iter::once(self.names.class_ref(slot.declared_in))
            .chain(slot.params.iter().map(|ty| self.names.ty(ty)))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// `ret name(params)`, qualified with `owner` for definitions.
    fn signature(&self, method: &LoweredMethod, owner: Option<Name>) -> String {
        let params: Vec<String> = method
            .params
            .iter()
            .map(|param| format!("{} {}", self.names.ty(&param.ty), self.names.name(param.name)))
            .collect();
        let qualifier = owner
            .map(|class| format!("{}::", self.names.struct_name(class)))
            .unwrap_or_default();
        format!(
            "{} {qualifier}{}({})",
            self.names.ty(&method.ret),
            self.names.name(method.name),
            params.join(", ")
        )
    }

    // Body

    pub fn body(&self, header_name: &str) -> String {
        let mut out = self.emitter();
        out.emit(&format!("#include \"{header_name}\""));
        out.emit_newline();
        out.emit_newline();
        out.emit("#include <iostream>");
        out.emit_newline();
        out.emit_newline();
        self.open_namespaces(&mut out);

        for class in &self.unit.classes {
            self.class_body(class, &mut out);
        }

        self.close_namespaces(&mut out);
        if self.options.entry_wrapper {
            self.entry_wrapper(&mut out);
        }
        out.trim_trailing_blank_lines();
        out.ensure_trailing_newline();
        out.output()
    }

    fn class_body(&self, class: &ClassLayout, out: &mut StringEmitter) {
        let data = self.names.struct_name(class.name);

        let inits: Vec<String> = class
            .default_ctor
            .members
            .iter()
            .map(|member| match member {
                MemberInit::Field { field, value } => format!(
                    "{}({})",
                    self.names.name(*field),
                    self.code.expr_string(*value)
                ),
                MemberInit::VtablePtr => "__vptr(&__vtable)".to_owned(),
            })
            .collect();
        out.emit(&format!("{data}::{data}() : {} {{}}", inits.join(", ")));
        out.emit_newline();
        out.emit_newline();

        for storage in &class.statics {
            out.emit(&format!(
                "{} {data}::{} = {};",
                self.names.ty(&storage.ty),
                self.names.name(storage.name),
                self.code.expr_string(storage.init)
            ));
            out.emit_newline();
        }
        if !class.statics.is_empty() {
            out.emit_newline();
        }

        self.class_identity(class, out);
        out.emit(&format!("{} {data}::__vtable;", self.names.vtable_name(class.name)));
        out.emit_newline();
        out.emit_newline();

        for method in class.init_routines.iter().chain(&class.methods) {
            out.emit(&self.signature(method, Some(class.name)));
            out.emit(" {");
            out.emit_newline();
            self.code.children(method.body, 1, out);
            out.emit("}");
            out.emit_newline();
            out.emit_newline();
        }
    }

    fn class_identity(&self, class: &ClassLayout, out: &mut StringEmitter) {
        let identity = &class.identity;
        let class_ty = self.names.class_ref(Name::CLASS);
        out.emit(&format!(
            "{class_ty} {}::__class() {{",
            self.names.struct_name(class.name)
        ));
        out.emit_newline();
        out.emit_indent(1);
        out.emit(&format!(
            "static {class_ty} k = new {}({}(\"{}\"), {}::__class());",
            self.names.struct_name(Name::CLASS),
            self.names.runtime_fn("literal"),
            escape(self.names.name(identity.qualified), '"'),
            self.names.struct_name(identity.parent)
        ));
        out.emit_newline();
        out.emit_indent(1);
        out.emit("return k;");
        out.emit_newline();
        out.emit("}");
        out.emit_newline();
        out.emit_newline();
    }

    fn entry(&self) -> Option<(&'a ClassLayout, &'a LoweredMethod)> {
        self.unit.classes.iter().find_map(|class| {
            class
                .methods
                .iter()
                .find(|method| method.kind == MethodKind::Entry)
                .map(|method| (class, method))
        })
    }

    /// Process `main` converting `argv` into the entry point's argument array.
    fn entry_wrapper(&self, out: &mut StringEmitter) {
        let Some((class, method)) = self.entry() else {
            return;
        };
        let target = format!(
            "{}{}::{}",
            self.package_prefix(),
            self.names.struct_name(class.name),
            self.names.name(method.name)
        );
        let string = self.names.class_ref(Name::STRING);

        out.emit_newline();
        out.emit("int main(int argc, char* argv[]) {");
        out.emit_newline();
        if method.params.is_empty() {
            out.emit_indent(1);
            out.emit(&format!("return {target}();"));
            out.emit_newline();
        } else {
            out.emit_indent(1);
            out.emit(&format!(
                "{}::Array<{string}> args = new {}::__Array<{string}>(argc - 1);",
                self.options.runtime, self.options.runtime
            ));
            out.emit_newline();
            out.emit_indent(1);
            out.emit("for (int32_t i = 1; i < argc; i++) {");
            out.emit_newline();
            out.emit_indent(2);
            out.emit(&format!(
                "(*args)[i - 1] = {}(argv[i]);",
                self.names.runtime_fn("literal")
            ));
            out.emit_newline();
            out.emit_indent(1);
            out.emit("}");
            out.emit_newline();
            out.emit_indent(1);
            out.emit(&format!("return {target}(args);"));
            out.emit_newline();
        }
        out.emit("}");
        out.emit_newline();
    }
}

/// `Zoo.h` for `zoo/Zoo.java`.
pub(crate) fn header_name(path: &Path) -> String {
    let stem = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("unit");
    format!("{stem}.h")
}
