//! Class layout synthesis.
//!
//! Builds a [`ClassLayout`] per user class from the program facts: data
//! members in initializer-chain order behind the vtable pointer, static
//! storage, the runtime type identity, the vtable and its bindings, the raw
//! default constructor, and every routine body.

mod vtable;

pub use vtable::{ClassVtable, VtableSet};

use clove_ir::{
    ClassDecl, ClassLayout, DataMember, DefaultCtor, MemberInit, StaticStorage, TypeIdentity,
};
use clove_types::{MethodRef, TypeQuery};
use tracing::debug;

use crate::rewrite::{Lowerer, Mode, RewriteCtx};
use crate::LowerError;

impl<Q: TypeQuery> Lowerer<'_, Q> {
    pub(crate) fn synthesize_class(&mut self, decl: &ClassDecl) -> Result<ClassLayout, LowerError> {
        let class = decl.name;
        let chains = self.chains;
        let chain = chains
            .instance(class)
            .ok_or(LowerError::MissingInitializers { class })?;
        let info = self.query.class(class);
        let parent = info.map_or_else(|| decl.parent_or_root(), |info| info.parent);
        let qualified = info.map_or(class, |info| info.qualified);

        let mut data = Vec::with_capacity(chain.len() + 1);
        data.push(DataMember::VtablePtr);
        data.extend(chain.iter().map(|init| DataMember::Field {
            name: init.name,
            ty: init.ty.clone(),
            owner: init.owner,
        }));

        let mut members = Vec::with_capacity(chain.len() + 1);
        for init in chain {
            let value = self.default_literal(init.default, decl.span);
            members.push(MemberInit::Field {
                field: init.name,
                value,
            });
        }
        members.push(MemberInit::VtablePtr);

        let mut ctx = RewriteCtx::new(class, None, Mode::Static);
        let mut statics = Vec::new();
        for init in chains.statics(class) {
            let value = if init.has_value() {
                self.lower_expr(&mut ctx, init.value)?
            } else {
                self.default_literal(init.default, decl.span)
            };
            statics.push(StaticStorage {
                name: init.name,
                ty: init.ty.clone(),
                init: value,
            });
        }

        let vtable = self
            .vtables
            .get(class)
            .cloned()
            .ok_or(LowerError::MissingAnnotation {
                method: class,
                annotation: "vtable",
                span: decl.span,
            })?;

        let mut init_routines = Vec::new();
        let mut methods = Vec::with_capacity(decl.methods.len());
        for (index, method) in decl.methods.iter().enumerate() {
            let method_ref = MethodRef {
                class,
                index: u32::try_from(index).unwrap_or(u32::MAX),
            };
            if method.is_constructor(class) {
                init_routines.push(self.lower_constructor(decl, method_ref, method)?);
            } else {
                methods.push(self.lower_method(decl, method_ref, method)?);
            }
        }
        if init_routines.is_empty() {
            init_routines.push(self.synthesized_init(decl)?);
        }

        debug!(
            ?class,
            fields = data.len() - 1,
            statics = statics.len(),
            slots = vtable.layout.slots.len(),
            inits = init_routines.len(),
            methods = methods.len(),
            "class layout"
        );
        Ok(ClassLayout {
            name: class,
            parent,
            identity: TypeIdentity {
                class,
                qualified,
                parent,
            },
            data,
            statics,
            vtable: vtable.layout,
            vtable_init: vtable.init,
            default_ctor: DefaultCtor { members },
            init_routines,
            methods,
        })
    }
}
