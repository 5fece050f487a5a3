//! Elemental type mapping.
//!
//! [`TypeMapper`] turns a source type expression plus an optional
//! marshaling override into a [`TypeDesc`]. Mapping is pure: references go
//! through the precomputed [`RefTable`], and fallbacks applied along the
//! way are reported back to the caller instead of being logged here.

use bitflags::bitflags;
use smallvec::SmallVec;

use tlx_meta::{
    ExternalKind, ExternalTypeRef, MarshalAs, NativeType, Primitive, ReflectionProvider,
    SourceKind, SourceTy, TypeId, WellKnown,
};
use tlx_typelib::{stdole, HRef, PointerWidth, TypeDesc, VarType};

use crate::classify::TargetKind;
use crate::references::{RefTable, ReferencedKind};

bitflags! {
    /// Position a type expression appears in.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct MapContext: u8 {
        const ARRAY_ELEMENT = 1 << 0;
        const RETURN = 1 << 1;
        const FIELD = 1 << 2;
        /// Passed by reference: the result is wrapped in a pointer.
        const BY_REF = 1 << 3;
    }
}

/// Why a type expression has no descriptor.
#[derive(Clone, Eq, PartialEq, Debug, thiserror::Error)]
pub enum Unmappable {
    #[error("generic types cannot be exported")]
    Generic,
    #[error("`void` is only valid as a return type")]
    Void,
    #[error("arrays of arrays cannot be exported")]
    NestedArray,
    #[error("marshaling override {native:?} does not apply to `{ty}`")]
    InvalidMarshal { ty: String, native: NativeType },
    #[error("record `{0}` has no descriptor")]
    UnresolvedRecord(String),
    #[error("inline arrays are only valid in record fields")]
    ByValArrayOutsideField,
    #[error("inline array has no element count")]
    MissingSize,
    #[error("`{0}` cannot be a safe-array element")]
    UnsupportedElement(String),
    #[error("`{0}` cannot be resolved")]
    Unresolved(String),
}

/// A degradation applied while mapping.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum Fallback {
    /// An interface or class reference became the generic object.
    GenericObject(String),
    /// An enum reference became its underlying integer.
    EnumAsInteger(String),
}

/// A successful mapping.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Mapped {
    pub desc: TypeDesc,
    pub fallbacks: SmallVec<[Fallback; 1]>,
}

/// Maps source type expressions to type descriptors.
pub(crate) struct TypeMapper<'a> {
    provider: &'a dyn ReflectionProvider,
    refs: &'a RefTable,
    width: PointerWidth,
}

impl<'a> TypeMapper<'a> {
    pub fn new(provider: &'a dyn ReflectionProvider, refs: &'a RefTable, width: PointerWidth) -> Self {
        TypeMapper {
            provider,
            refs,
            width,
        }
    }

    pub fn map(
        &self,
        ty: &SourceTy,
        marshal: Option<&MarshalAs>,
        ctx: MapContext,
    ) -> Result<Mapped, Unmappable> {
        let mut fallbacks = SmallVec::new();
        let desc = self.map_inner(ty, marshal, ctx, &mut fallbacks)?;
        let desc = if ctx.contains(MapContext::BY_REF) {
            TypeDesc::ptr(desc)
        } else {
            desc
        };
        Ok(Mapped { desc, fallbacks })
    }

    /// Whether values of `ty` are object references, for put-by-ref
    /// selection. Text and arrays are not.
    pub fn is_reference_type(&self, ty: &SourceTy) -> bool {
        match ty {
            SourceTy::Object => true,
            SourceTy::Named(id) => self.provider.source_type(*id).is_some_and(|t| {
                matches!(t.kind, SourceKind::Interface { .. } | SourceKind::Class { .. })
            }),
            SourceTy::External(ext) => {
                matches!(ext.kind, ExternalKind::Interface | ExternalKind::Class)
            }
            _ => false,
        }
    }

    fn map_inner(
        &self,
        ty: &SourceTy,
        marshal: Option<&MarshalAs>,
        ctx: MapContext,
        fallbacks: &mut SmallVec<[Fallback; 1]>,
    ) -> Result<TypeDesc, Unmappable> {
        let native = marshal.map(|m| m.native);
        let invalid = |native| Unmappable::InvalidMarshal {
            ty: ty.to_string(),
            native,
        };
        match ty {
            SourceTy::Generic(_) => Err(Unmappable::Generic),
            SourceTy::Void => {
                if ctx.contains(MapContext::RETURN) && !ctx.contains(MapContext::ARRAY_ELEMENT) {
                    Ok(TypeDesc::Base(VarType::VT_VOID))
                } else {
                    Err(Unmappable::Void)
                }
            }
            SourceTy::Primitive(p) => match (self.primitive(*p, native), native) {
                (Some(vt), _) => Ok(TypeDesc::Base(vt)),
                (None, Some(native)) => Err(invalid(native)),
                (None, None) => Err(Unmappable::Unresolved(ty.to_string())),
            },
            SourceTy::String => match native {
                None | Some(NativeType::BStr) => Ok(TypeDesc::Base(VarType::VT_BSTR)),
                Some(NativeType::LPStr) => Ok(TypeDesc::Base(VarType::VT_LPSTR)),
                Some(NativeType::LPWStr | NativeType::LPTStr) => {
                    Ok(TypeDesc::Base(VarType::VT_LPWSTR))
                }
                Some(other) => Err(invalid(other)),
            },
            SourceTy::StringBuilder => match native {
                None | Some(NativeType::LPWStr | NativeType::LPTStr) => {
                    Ok(TypeDesc::Base(VarType::VT_LPWSTR))
                }
                Some(NativeType::LPStr) => Ok(TypeDesc::Base(VarType::VT_LPSTR)),
                Some(other) => Err(invalid(other)),
            },
            SourceTy::Object => match native {
                None | Some(NativeType::Struct) => Ok(TypeDesc::Base(VarType::VT_VARIANT)),
                Some(NativeType::IUnknown | NativeType::Interface) => {
                    Ok(TypeDesc::Base(VarType::VT_UNKNOWN))
                }
                Some(NativeType::IDispatch) => Ok(TypeDesc::Base(VarType::VT_DISPATCH)),
                Some(other) => Err(invalid(other)),
            },
            SourceTy::WellKnown(w) => self.well_known(*w, native, ty),
            SourceTy::Array(elem) => self.array(elem, marshal, ctx, fallbacks),
            SourceTy::Pointer(pointee) => {
                if let Some(native) = native {
                    return Err(invalid(native));
                }
                let inner = match pointee.as_ref() {
                    SourceTy::Void => TypeDesc::Base(VarType::VT_VOID),
                    other => self.map_inner(other, None, MapContext::empty(), fallbacks)?,
                };
                Ok(TypeDesc::ptr(inner))
            }
            SourceTy::Named(id) => self.named(*id, native, ty, fallbacks),
            SourceTy::External(ext) => self.external(ext, native, ty, fallbacks),
        }
    }

    fn primitive(&self, p: Primitive, native: Option<NativeType>) -> Option<VarType> {
        use NativeType as N;
        use VarType as V;

        let vt = match (p, native) {
            (Primitive::Bool, None | Some(N::VariantBool)) => V::VT_BOOL,
            (Primitive::Bool, Some(N::Bool)) => V::VT_I4,
            (Primitive::Char, None) => V::VT_UI2,
            (Primitive::Bool | Primitive::Char, Some(N::I1)) => V::VT_I1,
            (Primitive::Bool | Primitive::Char, Some(N::U1)) => V::VT_UI1,
            (Primitive::Bool | Primitive::Char, Some(N::I2)) => V::VT_I2,
            (Primitive::Bool | Primitive::Char, Some(N::U2)) => V::VT_UI2,

            (Primitive::I8, None) | (Primitive::I8 | Primitive::U8, Some(N::I1)) => V::VT_I1,
            (Primitive::U8, None) | (Primitive::I8 | Primitive::U8, Some(N::U1)) => V::VT_UI1,
            (Primitive::I16, None) | (Primitive::I16 | Primitive::U16, Some(N::I2)) => V::VT_I2,
            (Primitive::U16, None) | (Primitive::I16 | Primitive::U16, Some(N::U2)) => V::VT_UI2,
            (Primitive::I32, None) | (Primitive::I32 | Primitive::U32, Some(N::I4)) => V::VT_I4,
            (Primitive::U32, None) | (Primitive::I32 | Primitive::U32, Some(N::U4)) => V::VT_UI4,
            (Primitive::I32 | Primitive::U32, Some(N::Error)) => V::VT_HRESULT,
            (Primitive::I64, None) | (Primitive::I64 | Primitive::U64, Some(N::I8)) => V::VT_I8,
            (Primitive::U64, None) | (Primitive::I64 | Primitive::U64, Some(N::U8)) => V::VT_UI8,
            (Primitive::I64 | Primitive::U64, Some(N::Currency)) => V::VT_CY,

            (Primitive::F32, None | Some(N::R4)) => V::VT_R4,
            (Primitive::F64, None | Some(N::R8)) => V::VT_R8,

            (Primitive::ISize, None) => match self.width {
                PointerWidth::Bits32 => V::VT_I4,
                PointerWidth::Bits64 => V::VT_I8,
            },
            (Primitive::USize, None) => match self.width {
                PointerWidth::Bits32 => V::VT_UI4,
                PointerWidth::Bits64 => V::VT_UI8,
            },
            (Primitive::ISize | Primitive::USize, Some(N::SysInt)) => V::VT_INT,
            (Primitive::ISize | Primitive::USize, Some(N::SysUInt)) => V::VT_UINT,
            _ => return None,
        };
        Some(vt)
    }

    fn well_known(
        &self,
        w: WellKnown,
        native: Option<NativeType>,
        ty: &SourceTy,
    ) -> Result<TypeDesc, Unmappable> {
        let stdole_type = |index| {
            self.refs
                .stdole(index)
                .map(TypeDesc::UserDefined)
                .ok_or_else(|| Unmappable::Unresolved(ty.to_string()))
        };
        match (w, native) {
            (WellKnown::DateTime, None) => Ok(TypeDesc::Base(VarType::VT_DATE)),
            (WellKnown::Decimal, None) => Ok(TypeDesc::Base(VarType::VT_DECIMAL)),
            (WellKnown::Decimal, Some(NativeType::Currency)) => Ok(TypeDesc::Base(VarType::VT_CY)),
            (WellKnown::Guid, None) => stdole_type(stdole::GUID_TYPE),
            (WellKnown::Color, None) => stdole_type(stdole::OLE_COLOR),
            (_, Some(native)) => Err(Unmappable::InvalidMarshal {
                ty: ty.to_string(),
                native,
            }),
        }
    }

    fn array(
        &self,
        elem: &SourceTy,
        marshal: Option<&MarshalAs>,
        ctx: MapContext,
        fallbacks: &mut SmallVec<[Fallback; 1]>,
    ) -> Result<TypeDesc, Unmappable> {
        if ctx.contains(MapContext::ARRAY_ELEMENT) || matches!(elem, SourceTy::Array(_)) {
            return Err(Unmappable::NestedArray);
        }
        let sub = marshal.and_then(MarshalAs::element);
        let elem_desc = self.map_inner(elem, sub.as_ref(), MapContext::ARRAY_ELEMENT, fallbacks)?;
        match marshal.map(|m| (m.native, m.size_const)) {
            None | Some((NativeType::SafeArray, _)) => {
                if safe_array_element_ok(&elem_desc) {
                    Ok(TypeDesc::safe_array(elem_desc))
                } else {
                    Err(Unmappable::UnsupportedElement(elem.to_string()))
                }
            }
            Some((NativeType::LPArray, _)) => Ok(TypeDesc::ptr(elem_desc)),
            Some((NativeType::ByValArray, size)) => {
                if !ctx.contains(MapContext::FIELD) {
                    return Err(Unmappable::ByValArrayOutsideField);
                }
                let len = size.ok_or(Unmappable::MissingSize)?;
                Ok(TypeDesc::c_array(elem_desc, len))
            }
            Some((native, _)) => Err(Unmappable::InvalidMarshal {
                ty: SourceTy::array_of(elem.clone()).to_string(),
                native,
            }),
        }
    }

    fn named(
        &self,
        id: TypeId,
        native: Option<NativeType>,
        ty: &SourceTy,
        fallbacks: &mut SmallVec<[Fallback; 1]>,
    ) -> Result<TypeDesc, Unmappable> {
        let source = self
            .provider
            .source_type(id)
            .ok_or_else(|| Unmappable::Unresolved(ty.to_string()))?;
        let qualified = source.qualified_name();
        let local = self.refs.local(id);

        match &source.kind {
            SourceKind::Interface { .. } | SourceKind::Class { .. } => {
                if let Some(desc) = object_override(native) {
                    return desc.map_err(|native| Unmappable::InvalidMarshal {
                        ty: qualified,
                        native,
                    });
                }
                let target = local.and_then(|l| match l.kind {
                    TargetKind::Interface(_) => Some(HRef::Local(l.handle)),
                    TargetKind::CoClass { .. } => l.default,
                    TargetKind::Enum | TargetKind::Record => None,
                });
                Ok(match target {
                    Some(href) => TypeDesc::ptr(TypeDesc::UserDefined(href)),
                    None => {
                        fallbacks.push(Fallback::GenericObject(qualified));
                        TypeDesc::Base(VarType::VT_UNKNOWN)
                    }
                })
            }
            SourceKind::Enum { underlying, .. } => {
                if let Some(native) = native {
                    return self.enum_override(*underlying, native, &qualified);
                }
                Ok(match local {
                    Some(l) => TypeDesc::UserDefined(HRef::Local(l.handle)),
                    None => {
                        fallbacks.push(Fallback::EnumAsInteger(qualified.clone()));
                        self.enum_base(*underlying, &qualified)?
                    }
                })
            }
            SourceKind::Record { .. } => {
                if let Some(native) = native {
                    return Err(Unmappable::InvalidMarshal {
                        ty: qualified,
                        native,
                    });
                }
                local
                    .map(|l| TypeDesc::UserDefined(HRef::Local(l.handle)))
                    .ok_or(Unmappable::UnresolvedRecord(qualified))
            }
        }
    }

    fn external(
        &self,
        ext: &ExternalTypeRef,
        native: Option<NativeType>,
        ty: &SourceTy,
        fallbacks: &mut SmallVec<[Fallback; 1]>,
    ) -> Result<TypeDesc, Unmappable> {
        let qualified = ext.qualified_name();
        let resolved = self.refs.external(ext);
        match ext.kind {
            ExternalKind::Interface | ExternalKind::Class => {
                if let Some(desc) = object_override(native) {
                    return desc.map_err(|native| Unmappable::InvalidMarshal {
                        ty: ty.to_string(),
                        native,
                    });
                }
                let target = resolved.and_then(|r| match r.kind {
                    ReferencedKind::Interface => Some(r.href),
                    ReferencedKind::CoClass => r.default,
                    ReferencedKind::Enum | ReferencedKind::Record => None,
                });
                Ok(match target {
                    Some(href) => TypeDesc::ptr(TypeDesc::UserDefined(href)),
                    None => {
                        fallbacks.push(Fallback::GenericObject(qualified));
                        TypeDesc::Base(VarType::VT_UNKNOWN)
                    }
                })
            }
            ExternalKind::Enum { underlying } => {
                if let Some(native) = native {
                    return self.enum_override(underlying, native, &qualified);
                }
                Ok(match resolved {
                    Some(r) => TypeDesc::UserDefined(r.href),
                    None => {
                        fallbacks.push(Fallback::EnumAsInteger(qualified.clone()));
                        self.enum_base(underlying, &qualified)?
                    }
                })
            }
            ExternalKind::Record => {
                if let Some(native) = native {
                    return Err(Unmappable::InvalidMarshal {
                        ty: qualified,
                        native,
                    });
                }
                resolved
                    .map(|r| TypeDesc::UserDefined(r.href))
                    .ok_or(Unmappable::UnresolvedRecord(qualified))
            }
        }
    }

    fn enum_base(&self, underlying: Primitive, qualified: &str) -> Result<TypeDesc, Unmappable> {
        self.primitive(underlying, None)
            .map(TypeDesc::Base)
            .ok_or_else(|| Unmappable::Unresolved(qualified.to_owned()))
    }

    /// An integer override of an enum's underlying width.
    fn enum_override(
        &self,
        underlying: Primitive,
        native: NativeType,
        qualified: &str,
    ) -> Result<TypeDesc, Unmappable> {
        match self.primitive(underlying, Some(native)) {
            Some(vt) if vt.is_integer() => Ok(TypeDesc::Base(vt)),
            _ => Err(Unmappable::InvalidMarshal {
                ty: qualified.to_owned(),
                native,
            }),
        }
    }
}

/// Object overrides allowed on interface and class references.
///
/// `None` means no override; `Some(Err(native))` an override that does not
/// apply.
fn object_override(native: Option<NativeType>) -> Option<Result<TypeDesc, NativeType>> {
    match native? {
        NativeType::IUnknown => Some(Ok(TypeDesc::Base(VarType::VT_UNKNOWN))),
        NativeType::IDispatch => Some(Ok(TypeDesc::Base(VarType::VT_DISPATCH))),
        NativeType::Interface => None,
        other => Some(Err(other)),
    }
}

/// Interface pointers are valid safe-array elements even though other
/// pointers are not.
fn safe_array_element_ok(desc: &TypeDesc) -> bool {
    match desc {
        TypeDesc::Ptr(inner) => matches!(inner.as_ref(), TypeDesc::UserDefined(_)),
        other => other.vt().is_safearray_element(),
    }
}
