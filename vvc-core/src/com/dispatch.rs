//! Late-bound `IDispatch` plumbing.
//!
//! The host registers its automation object for late binding only, so
//! every operation goes through `GetIDsOfNames` + `Invoke`.  DISPIDs are
//! cached per object.  Array-valued operations hand the host a by-ref
//! SAFEARRAY sized by the caller -- the host sizes its reply by the size
//! of the array it receives -- and read the filled array back out.
//!
//! All conversions into [`VvError`] happen here; no `windows::core::Error`
//! leaves this module.

use std::cell::RefCell;
use std::collections::HashMap;
use std::ffi::c_void;
use std::ptr;

use windows::core::{Interface, BSTR, GUID, PCWSTR};
use windows::Win32::System::Com::{
    CLSIDFromProgID, IDispatch, DISPATCH_FLAGS, DISPATCH_METHOD, DISPATCH_PROPERTYGET,
    DISPATCH_PROPERTYPUT, DISPPARAMS, EXCEPINFO, SAFEARRAY, SAFEARRAYBOUND,
};
use windows::Win32::System::Ole::{
    GetActiveObject, SafeArrayCreate, SafeArrayDestroy, SafeArrayGetDim, SafeArrayGetElement,
    SafeArrayGetLBound, SafeArrayGetUBound,
};
use windows::Win32::System::Variant::{
    VariantChangeType, VAR_CHANGE_FLAGS, VARENUM, VARIANT, VT_ARRAY, VT_BOOL, VT_BSTR, VT_BYREF,
    VT_I4, VT_R8,
};

use crate::errors::VvError;

const LOCALE_USER_DEFAULT: u32 = 0x0400;
const DISPID_PROPERTYPUT: i32 = -3;

// HRESULTs this module triages into the error taxonomy.
const DISP_E_MEMBERNOTFOUND: i32 = 0x8002_0003_u32 as i32;
const DISP_E_UNKNOWNNAME: i32 = 0x8002_0006_u32 as i32;
const DISP_E_EXCEPTION: i32 = 0x8002_0009_u32 as i32;
const RPC_E_DISCONNECTED: i32 = 0x8001_0108_u32 as i32;
const RPC_E_SERVERCALL_RETRYLATER: i32 = 0x8001_010A_u32 as i32;
const RPC_SERVER_UNAVAILABLE: i32 = 0x8007_06BA_u32 as i32;

/// Wide, nul-terminated copy of a `&str` for PCWSTR arguments.
fn to_wide(s: &str) -> Vec<u16> {
    s.encode_utf16().chain(std::iter::once(0)).collect()
}

/// Triage an `Invoke`/`GetIDsOfNames` failure into the error taxonomy.
fn triage(operation: &str, err: windows::core::Error, excep: Option<&EXCEPINFO>) -> VvError {
    match err.code().0 {
        DISP_E_MEMBERNOTFOUND | DISP_E_UNKNOWNNAME => VvError::unavailable(operation),
        RPC_E_DISCONNECTED | RPC_E_SERVERCALL_RETRYLATER | RPC_SERVER_UNAVAILABLE => {
            VvError::Connectivity(format!("lost the host process during {operation}: {err}"))
        }
        DISP_E_EXCEPTION => {
            let description = excep
                .map(|e| e.bstrDescription.to_string())
                .filter(|d| !d.is_empty())
                .unwrap_or_else(|| err.message().to_string());
            VvError::invocation(operation, description)
        }
        _ => VvError::invocation(operation, err.message().to_string()),
    }
}

// ---------------------------------------------------------------------------
// VARIANT helpers
// ---------------------------------------------------------------------------

pub fn variant_i32(value: i32) -> VARIANT {
    VARIANT::from(value)
}

pub fn variant_f64(value: f64) -> VARIANT {
    VARIANT::from(value)
}

pub fn variant_bool(value: bool) -> VARIANT {
    VARIANT::from(value)
}

pub fn variant_str(value: &str) -> VARIANT {
    VARIANT::from(value)
}

/// A by-ref VARIANT aliasing a caller-owned BSTR out-parameter.
pub fn byref_bstr(target: &mut BSTR) -> VARIANT {
    let mut var = VARIANT::default();
    unsafe {
        let inner = &mut var.Anonymous.Anonymous;
        inner.vt = VARENUM(VT_BYREF.0 | VT_BSTR.0);
        inner.Anonymous.pbstrVal = target;
    }
    var
}

/// A by-ref VARIANT aliasing a caller-owned i32 out-parameter.
pub fn byref_i32(target: &mut i32) -> VARIANT {
    let mut var = VARIANT::default();
    unsafe {
        let inner = &mut var.Anonymous.Anonymous;
        inner.vt = VARENUM(VT_BYREF.0 | VT_I4.0);
        inner.Anonymous.plVal = target;
    }
    var
}

fn coerce(operation: &str, value: &VARIANT, vt: VARENUM) -> Result<VARIANT, VvError> {
    let mut out = VARIANT::default();
    unsafe {
        VariantChangeType(&mut out, value, VAR_CHANGE_FLAGS(0), vt).map_err(|e| {
            VvError::invocation(
                operation,
                format!("host returned an unconvertible value: {e}"),
            )
        })?;
    }
    Ok(out)
}

pub fn variant_to_i32(operation: &str, value: &VARIANT) -> Result<i32, VvError> {
    let out = coerce(operation, value, VT_I4)?;
    Ok(unsafe { out.Anonymous.Anonymous.Anonymous.lVal })
}

pub fn variant_to_u32(operation: &str, value: &VARIANT) -> Result<u32, VvError> {
    Ok(variant_to_i32(operation, value)? as u32)
}

pub fn variant_to_f64(operation: &str, value: &VARIANT) -> Result<f64, VvError> {
    let out = coerce(operation, value, VT_R8)?;
    Ok(unsafe { out.Anonymous.Anonymous.Anonymous.dblVal })
}

pub fn variant_to_bool(operation: &str, value: &VARIANT) -> Result<bool, VvError> {
    let out = coerce(operation, value, VT_BOOL)?;
    Ok(unsafe { out.Anonymous.Anonymous.Anonymous.boolVal }.as_bool())
}

pub fn variant_to_string(operation: &str, value: &VARIANT) -> Result<String, VvError> {
    let out = coerce(operation, value, VT_BSTR)?;
    Ok(unsafe { out.Anonymous.Anonymous.Anonymous.bstrVal.to_string() })
}

// ---------------------------------------------------------------------------
// SAFEARRAY helpers
// ---------------------------------------------------------------------------

/// Owns a SAFEARRAY for the duration of one by-ref call.
pub struct OwnedSafeArray {
    psa: *mut SAFEARRAY,
    element_vt: VARENUM,
}

impl OwnedSafeArray {
    /// One-dimensional zeroed `f64` array of `len` elements.
    pub fn f64_vector(operation: &str, len: usize) -> Result<Self, VvError> {
        let bound = SAFEARRAYBOUND {
            cElements: len as u32,
            lLbound: 0,
        };
        Self::create(operation, VT_R8, &[bound])
    }

    /// Two-dimensional zeroed `f64` array of `rows` x 1, the shape the
    /// host expects for raw vector reads.
    pub fn f64_matrix(operation: &str, rows: usize) -> Result<Self, VvError> {
        let bounds = [
            SAFEARRAYBOUND {
                cElements: rows as u32,
                lLbound: 0,
            },
            SAFEARRAYBOUND {
                cElements: 1,
                lLbound: 0,
            },
        ];
        Self::create(operation, VT_R8, &bounds)
    }

    /// Two-dimensional `rows` x 2 BSTR array for TEDS name/value pairs.
    pub fn string_pairs(operation: &str, rows: usize) -> Result<Self, VvError> {
        let bounds = [
            SAFEARRAYBOUND {
                cElements: rows as u32,
                lLbound: 0,
            },
            SAFEARRAYBOUND {
                cElements: 2,
                lLbound: 0,
            },
        ];
        Self::create(operation, VT_BSTR, &bounds)
    }

    fn create(
        operation: &str,
        element_vt: VARENUM,
        bounds: &[SAFEARRAYBOUND],
    ) -> Result<Self, VvError> {
        let psa = unsafe { SafeArrayCreate(element_vt, bounds.len() as u32, bounds.as_ptr()) };
        if psa.is_null() {
            return Err(VvError::invocation(
                operation,
                "could not allocate a SAFEARRAY for the call",
            ));
        }
        Ok(Self { psa, element_vt })
    }

    /// A by-ref VARIANT aliasing this array.  The VARIANT does not take
    /// ownership; the array outlives the call through `self`.
    pub fn as_byref_variant(&mut self) -> VARIANT {
        let mut var = VARIANT::default();
        unsafe {
            let inner = &mut var.Anonymous.Anonymous;
            inner.vt = VARENUM(VT_ARRAY.0 | VT_BYREF.0 | self.element_vt.0);
            inner.Anonymous.pparray = &mut self.psa;
        }
        var
    }

    /// Read the (host-filled) array back as a flat `f64` vector.  For a
    /// two-dimensional array only the first column is read.
    pub fn read_f64(&self, operation: &str) -> Result<Vec<f64>, VvError> {
        let fail = |e: windows::core::Error| triage(operation, e, None);
        unsafe {
            let dims = SafeArrayGetDim(self.psa);
            let lbound = SafeArrayGetLBound(self.psa, 1).map_err(fail)?;
            let ubound = SafeArrayGetUBound(self.psa, 1).map_err(fail)?;
            let mut samples = Vec::with_capacity((ubound - lbound + 1).max(0) as usize);
            for i in lbound..=ubound {
                let mut value = 0.0f64;
                // rgIndices[0] addresses the rightmost dimension.
                let indices: [i32; 2] = [0, i];
                let rank = if dims >= 2 { 2 } else { 1 };
                let first = indices.len() - rank;
                SafeArrayGetElement(
                    self.psa,
                    indices[first..].as_ptr(),
                    &mut value as *mut f64 as *mut c_void,
                )
                .map_err(fail)?;
                samples.push(value);
            }
            Ok(samples)
        }
    }

    /// Read the (host-filled) array back as `(name, value)` string pairs.
    pub fn read_string_pairs(&self, operation: &str) -> Result<Vec<(String, String)>, VvError> {
        let fail = |e: windows::core::Error| triage(operation, e, None);
        unsafe {
            let lbound = SafeArrayGetLBound(self.psa, 1).map_err(fail)?;
            let ubound = SafeArrayGetUBound(self.psa, 1).map_err(fail)?;
            let mut pairs = Vec::new();
            for row in lbound..=ubound {
                let cell = |col: i32| -> Result<String, VvError> {
                    let mut value = BSTR::default();
                    // rgIndices[0] addresses the rightmost dimension.
                    let indices = [col, row];
                    SafeArrayGetElement(
                        self.psa,
                        indices.as_ptr(),
                        &mut value as *mut BSTR as *mut c_void,
                    )
                    .map_err(fail)?;
                    Ok(value.to_string())
                };
                pairs.push((cell(0)?, cell(1)?));
            }
            Ok(pairs)
        }
    }
}

impl Drop for OwnedSafeArray {
    fn drop(&mut self) {
        unsafe {
            let _ = SafeArrayDestroy(self.psa);
        }
    }
}

// ---------------------------------------------------------------------------
// Dispatch object
// ---------------------------------------------------------------------------

/// A late-bound handle to one running automation object.
pub struct DispatchObject {
    dispatch: IDispatch,
    dispids: RefCell<HashMap<String, i32>>,
}

impl DispatchObject {
    /// Attach to the running instance registered under `progid`.
    ///
    /// A single attempt: the host is never launched and the lookup is
    /// never retried.
    pub fn attach(progid: &str) -> Result<Self, VvError> {
        let wide = to_wide(progid);
        let clsid = unsafe { CLSIDFromProgID(PCWSTR(wide.as_ptr())) }.map_err(|e| {
            VvError::Connectivity(format!("ProgID {progid} is not registered: {e}"))
        })?;

        let mut unknown = None;
        unsafe { GetActiveObject(&clsid, None, &mut unknown) }.map_err(|e| {
            VvError::Connectivity(format!("no running instance of {progid}: {e}"))
        })?;
        let unknown = unknown.ok_or_else(|| {
            VvError::Connectivity(format!("no running instance of {progid}"))
        })?;

        let dispatch: IDispatch = unknown.cast().map_err(|e| {
            VvError::Connectivity(format!("{progid} does not expose IDispatch: {e}"))
        })?;

        Ok(Self {
            dispatch,
            dispids: RefCell::new(HashMap::new()),
        })
    }

    fn dispid(&self, operation: &str) -> Result<i32, VvError> {
        if let Some(&id) = self.dispids.borrow().get(operation) {
            return Ok(id);
        }
        let wide = to_wide(operation);
        let names = [PCWSTR(wide.as_ptr())];
        let mut id = 0i32;
        unsafe {
            self.dispatch
                .GetIDsOfNames(&GUID::zeroed(), names.as_ptr(), 1, LOCALE_USER_DEFAULT, &mut id)
        }
        .map_err(|e| triage(operation, e, None))?;
        self.dispids.borrow_mut().insert(operation.to_owned(), id);
        Ok(id)
    }

    fn invoke(
        &self,
        operation: &str,
        flags: DISPATCH_FLAGS,
        args: &mut [VARIANT],
        property_put: bool,
    ) -> Result<VARIANT, VvError> {
        let dispid = self.dispid(operation)?;

        // DISPPARAMS wants arguments right-to-left.
        args.reverse();

        let mut named = [DISPID_PROPERTYPUT];
        let params = DISPPARAMS {
            rgvarg: if args.is_empty() {
                ptr::null_mut()
            } else {
                args.as_mut_ptr()
            },
            rgdispidNamedArgs: if property_put {
                named.as_mut_ptr()
            } else {
                ptr::null_mut()
            },
            cArgs: args.len() as u32,
            cNamedArgs: if property_put { 1 } else { 0 },
        };

        let mut result = VARIANT::default();
        let mut excep = EXCEPINFO::default();
        unsafe {
            self.dispatch.Invoke(
                dispid,
                &GUID::zeroed(),
                LOCALE_USER_DEFAULT,
                flags,
                &params,
                Some(&mut result),
                Some(&mut excep),
                None,
            )
        }
        .map_err(|e| triage(operation, e, Some(&excep)))?;
        Ok(result)
    }

    /// Invoke a method (or parameterized property get).
    pub fn call(&self, operation: &str, mut args: Vec<VARIANT>) -> Result<VARIANT, VvError> {
        self.invoke(
            operation,
            DISPATCH_FLAGS(DISPATCH_METHOD.0 | DISPATCH_PROPERTYGET.0),
            &mut args,
            false,
        )
    }

    /// Read a plain property.
    pub fn get(&self, operation: &str) -> Result<VARIANT, VvError> {
        self.invoke(operation, DISPATCH_PROPERTYGET, &mut [], false)
    }

    /// Write a plain property.
    pub fn put(&self, operation: &str, value: VARIANT) -> Result<(), VvError> {
        self.invoke(operation, DISPATCH_PROPERTYPUT, &mut [value], true)?;
        Ok(())
    }
}
