use alloc::{boxed::Box, sync::Arc, vec::Vec};
use core::{fmt, mem::ManuallyDrop, mem::MaybeUninit};

use super::bitflags::bitflags;
use crate::{
    Attribute, AttributeList, Declaration, Declare, HasAttributes, PtrConst, PtrMut, PtrUninit,
    Reflect, RttiError, StableId, Type, Variable, fatal, hash_name, is_a,
};

bitflags! {
    /// How a method is invoked.
    pub struct MethodFlags: u8 {
        /// Called without a receiver.
        const STATIC = 1 << 0;
        /// Takes its receiver by shared reference.
        const CONST = 1 << 1;
        /// Backed by a closure that receives the receiver as its first argument.
        const LAMBDA = 1 << 2;
    }
}

type ErasedFn = dyn Fn(Option<PtrMut>, Option<PtrUninit>, &[PtrMut]) + Send + Sync;

/// A uniform `(object, return slot, arguments)` entry point wrapping a
/// statically typed function.
///
/// The wrapped closure unpacks every argument slot as the parameter type it
/// was generated for; nothing is re-checked at this boundary.
pub struct Thunk(Box<ErasedFn>);

impl Thunk {
    /// Wraps an erased invocation closure.
    ///
    /// # Safety
    ///
    /// The method this thunk ends up in vouches for it: `f` must treat
    /// `object`, `ret` and `args` exactly as that method's flags, argument
    /// declarations and return declaration describe them. In particular it
    /// must move every argument out and, when the method returns a value,
    /// initialize `ret` before returning.
    ///
    /// ```compile_fail
    /// let thunk = rtti_core::Thunk::new(|_, _, _| {});
    /// ```
    pub unsafe fn new<F>(f: F) -> Self
    where
        F: Fn(Option<PtrMut>, Option<PtrUninit>, &[PtrMut]) + Send + Sync + 'static,
    {
        Self(Box::new(f))
    }

    /// Runs the wrapped function.
    ///
    /// # Safety
    /// `object`, `ret` and every element of `args` must point to values of
    /// exactly the types the thunk was generated for. Each argument is moved
    /// out; the caller must not drop them afterwards.
    #[inline]
    pub unsafe fn invoke(&self, object: Option<PtrMut>, ret: Option<PtrUninit>, args: &[PtrMut]) {
        (self.0)(object, ret, args)
    }
}

impl fmt::Debug for Thunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Thunk")
    }
}

/// A tuple of typed arguments that can be handed to an erased call.
///
/// # Safety
///
/// `DECLARATIONS[i]` must describe the `i`-th element, and `pack` must lend
/// exactly one pointer per element, in order, without dropping any of them
/// afterwards.
pub unsafe trait ArgPack {
    /// Declarations of the elements, in order.
    const DECLARATIONS: &'static [Declaration];

    /// Lends the erased addresses of all elements to `f`, which takes
    /// ownership of them.
    fn pack<Ret>(self, f: impl FnOnce(&[PtrMut]) -> Ret) -> Ret;
}

unsafe impl ArgPack for () {
    const DECLARATIONS: &'static [Declaration] = &[];

    fn pack<Ret>(self, f: impl FnOnce(&[PtrMut]) -> Ret) -> Ret {
        f(&[])
    }
}

macro_rules! impl_arg_pack {
    {
        continue from ($($elems:ident.$idx:tt,)+),
        remaining ()
    } => {};
    {
        continue from ($($elems:ident.$idx:tt,)+),
        remaining ($next:ident.$nextidx:tt, $($remaining:ident.$remainingidx:tt,)*)
    } => {
        impl_arg_pack! {
            impl ($($elems.$idx,)+ $next.$nextidx,),
            remaining ($($remaining.$remainingidx,)*)
        }
    };
    {
        impl ($($elems:ident.$idx:tt,)+),
        remaining ($($remaining:ident.$remainingidx:tt,)*)
    } => {
        unsafe impl<$($elems: Declare),+> ArgPack for ($($elems,)+) {
            const DECLARATIONS: &'static [Declaration] = &[$($elems::DECLARATION),+];

            fn pack<Ret>(self, f: impl FnOnce(&[PtrMut]) -> Ret) -> Ret {
                let mut this = ManuallyDrop::new(self);
                f(&[$(PtrMut::new(&mut this.$idx as *mut $elems)),+])
            }
        }

        impl_arg_pack! {
            continue from ($($elems.$idx,)+),
            remaining ($($remaining.$remainingidx,)*)
        }
    };
    { ($first:ident.$firstidx:tt $(, $remaining:ident.$remainingidx:tt)* $(,)?) } => {
        impl_arg_pack! {
            impl ($first.$firstidx,),
            remaining ($($remaining.$remainingidx,)*)
        }
    };
}

impl_arg_pack! {
    (A0.0, A1.1, A2.2, A3.3, A4.4, A5.5, A6.6, A7.7)
}

/// A described, invocable member function, static function or closure
/// adapter standing in for one.
pub struct Method {
    name: &'static str,
    id: StableId,
    flags: MethodFlags,
    thunk: Thunk,
    returns: Variable,
    arguments: Vec<Variable>,
    owner: fn() -> &'static Type,
    attributes: AttributeList,
}

/// Builder for [`Method`].
pub struct MethodBuilder {
    name: &'static str,
    owner: fn() -> &'static Type,
    flags: MethodFlags,
    returns: Declaration,
    arguments: Vec<Variable>,
    attributes: AttributeList,
    thunk: Option<Thunk>,
}

impl MethodBuilder {
    /// Sets the invocation flags.
    pub fn flags(mut self, flags: MethodFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Sets the return declaration (`()` for none).
    pub fn returns(mut self, returns: Declaration) -> Self {
        self.returns = returns;
        self
    }

    /// Sets the declared arguments. Lambda adapters do not list their receiver.
    pub fn arguments(mut self, arguments: Vec<Variable>) -> Self {
        self.arguments = arguments;
        self
    }

    /// Attaches attributes.
    pub fn attributes(mut self, attributes: AttributeList) -> Self {
        self.attributes = attributes;
        self
    }

    /// Sets the erased entry point.
    pub fn thunk(mut self, thunk: Thunk) -> Self {
        self.thunk = Some(thunk);
        self
    }

    /// Finishes the method.
    ///
    /// # Panics
    /// Panics if no thunk was set.
    pub fn build(self) -> Method {
        let Some(thunk) = self.thunk else {
            panic!("method {} was built without a thunk", self.name)
        };
        Method {
            name: self.name,
            id: hash_name(self.name),
            flags: self.flags,
            thunk,
            returns: Variable::new("return", self.returns),
            arguments: self.arguments,
            owner: self.owner,
            attributes: self.attributes,
        }
    }
}

impl Method {
    /// Starts describing a method named `name`, declared by `owner`.
    pub fn builder(name: &'static str, owner: fn() -> &'static Type) -> MethodBuilder {
        MethodBuilder {
            name,
            owner,
            flags: MethodFlags::empty(),
            returns: <() as Declare>::DECLARATION,
            arguments: Vec::new(),
            attributes: AttributeList::new(),
            thunk: None,
        }
    }

    /// Name of the method.
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Stable id, the hash of the name.
    #[inline]
    pub fn id(&self) -> StableId {
        self.id
    }

    /// Invocation flags.
    #[inline]
    pub fn flags(&self) -> MethodFlags {
        self.flags
    }

    /// `true` for methods without a receiver.
    #[inline]
    pub fn is_static(&self) -> bool {
        self.flags.contains(MethodFlags::STATIC)
    }

    /// `true` for methods taking `&self`.
    #[inline]
    pub fn is_const(&self) -> bool {
        self.flags.contains(MethodFlags::CONST)
    }

    /// `true` for closure adapters.
    #[inline]
    pub fn is_lambda(&self) -> bool {
        self.flags.contains(MethodFlags::LAMBDA)
    }

    /// The return slot; its declaration is void for methods returning nothing.
    #[inline]
    pub fn returns(&self) -> &Variable {
        &self.returns
    }

    /// Declared arguments, receiver excluded.
    #[inline]
    pub fn arguments(&self) -> &[Variable] {
        &self.arguments
    }

    /// The type declaring this method.
    #[inline]
    pub fn owner(&self) -> &'static Type {
        (self.owner)()
    }

    fn check_receiver(&self, has_object: bool) -> Result<(), RttiError> {
        if self.is_static() == has_object {
            return Err(RttiError::Receiver {
                method: self.name,
                is_static: self.is_static(),
            });
        }
        Ok(())
    }

    fn check_object<O: Reflect>(&self) -> Result<(), RttiError> {
        let actual = O::type_of();
        if !actual.describes::<O>() {
            return Err(RttiError::Foreign {
                ty: actual,
                rust: core::any::type_name::<O>(),
            });
        }
        let expected = self.owner();
        if !is_a(actual, expected) {
            return Err(RttiError::NotA { expected, actual });
        }
        Ok(())
    }

    fn check_return<R: Declare>(&self, has_slot: bool) -> Result<(), RttiError> {
        let declared = self.returns.declaration();
        match (declared.is_void(), has_slot) {
            (true, false) => Ok(()),
            (true, true) => Err(RttiError::UnexpectedReturnSlot { method: self.name }),
            (false, false) => Err(RttiError::MissingReturnSlot { method: self.name }),
            (false, true) => {
                if declared.as_pointer().converts_to(&R::DECLARATION) {
                    Ok(())
                } else {
                    Err(RttiError::ReturnType {
                        method: self.name,
                        declared: *declared,
                        provided: R::DECLARATION,
                    })
                }
            }
        }
    }

    fn check_arguments<A: ArgPack>(&self) -> Result<(), RttiError> {
        let provided = A::DECLARATIONS;
        if provided.len() != self.arguments.len() {
            return Err(RttiError::ArgumentCount {
                method: self.name,
                expected: self.arguments.len(),
                actual: provided.len(),
            });
        }
        for (index, (param, arg)) in self.arguments.iter().zip(provided).enumerate() {
            if !param.declaration().accepts(arg) {
                return Err(RttiError::ArgumentType {
                    method: self.name,
                    index,
                    declared: *param.declaration(),
                    provided: *arg,
                });
            }
        }
        Ok(())
    }

    /// Calls with an already validated receiver and arguments, writing the
    /// result into `ret` when there is one.
    fn dispatch<R: Declare, A: ArgPack>(
        &self,
        object: Option<PtrMut>,
        ret: Option<&mut R>,
        args: A,
    ) -> Result<(), RttiError> {
        self.check_return::<R>(ret.is_some())?;
        self.check_arguments::<A>()?;
        crate::trace!("call {}::{}", self.owner().name(), self.name);
        match ret {
            None => args.pack(|erased| unsafe { self.unsafe_call(object, None, erased) }),
            Some(slot) => {
                let mut out = MaybeUninit::<R>::uninit();
                let out_ptr = PtrUninit::from_maybe_uninit(&mut out);
                // SAFETY: the return declaration converts to `R`, so the thunk
                // writes an `R` (or a thin pointer with the same representation).
                args.pack(|erased| unsafe { self.unsafe_call(object, Some(out_ptr), erased) });
                *slot = unsafe { out.assume_init() };
            }
        }
        Ok(())
    }

    /// Like [`Method::dispatch`], but returns the result by value.
    fn dispatch_value<R: Declare, A: ArgPack>(
        &self,
        object: Option<PtrMut>,
        args: A,
    ) -> Result<R, RttiError> {
        self.check_return::<R>(!R::IS_VOID)?;
        self.check_arguments::<A>()?;
        crate::trace!("invoke {}::{}", self.owner().name(), self.name);
        let mut out = MaybeUninit::<R>::uninit();
        let ret = (!R::IS_VOID).then(|| PtrUninit::from_maybe_uninit(&mut out));
        args.pack(|erased| unsafe { self.unsafe_call(object, ret, erased) });
        // SAFETY: the thunk initialized the slot, or `R` is `()`.
        Ok(unsafe { out.assume_init() })
    }

    /// Calls a member method on `owner`.
    ///
    /// `ret` must be `Some` exactly when the method returns something. A
    /// method returning a reference writes its address: use a raw pointer
    /// slot for it.
    pub fn try_call_method<O: Reflect, R: Declare, A: ArgPack>(
        &self,
        owner: &mut O,
        ret: Option<&mut R>,
        args: A,
    ) -> Result<(), RttiError> {
        self.check_receiver(true)?;
        self.check_object::<O>()?;
        self.dispatch(Some(PtrMut::from_mut(owner)), ret, args)
    }

    /// Calls a member method on `owner`, panicking on any mismatch.
    #[track_caller]
    pub fn call_method<O: Reflect, R: Declare, A: ArgPack>(
        &self,
        owner: &mut O,
        ret: Option<&mut R>,
        args: A,
    ) {
        if let Err(err) = self.try_call_method(owner, ret, args) {
            fatal(err)
        }
    }

    /// Calls a `&self` method through a shared reference.
    pub fn try_call_const_method<O: Reflect, R: Declare, A: ArgPack>(
        &self,
        owner: &O,
        ret: Option<&mut R>,
        args: A,
    ) -> Result<(), RttiError> {
        self.check_receiver(true)?;
        if !self.is_const() {
            return Err(RttiError::ConstReceiver { method: self.name });
        }
        self.check_object::<O>()?;
        // SAFETY: const methods only ever borrow their receiver immutably.
        let object = unsafe { PtrConst::from_ref(owner).into_mut() };
        self.dispatch(Some(object), ret, args)
    }

    /// Calls a `&self` method through a shared reference, panicking on any
    /// mismatch.
    #[track_caller]
    pub fn call_const_method<O: Reflect, R: Declare, A: ArgPack>(
        &self,
        owner: &O,
        ret: Option<&mut R>,
        args: A,
    ) {
        if let Err(err) = self.try_call_const_method(owner, ret, args) {
            fatal(err)
        }
    }

    /// Calls a static method.
    pub fn try_call_static_method<R: Declare, A: ArgPack>(
        &self,
        ret: Option<&mut R>,
        args: A,
    ) -> Result<(), RttiError> {
        self.check_receiver(false)?;
        self.dispatch(None, ret, args)
    }

    /// Calls a static method, panicking on any mismatch.
    #[track_caller]
    pub fn call_static_method<R: Declare, A: ArgPack>(&self, ret: Option<&mut R>, args: A) {
        if let Err(err) = self.try_call_static_method(ret, args) {
            fatal(err)
        }
    }

    /// Calls a member method and returns its result (`()` for none).
    pub fn try_invoke<O: Reflect, R: Declare, A: ArgPack>(
        &self,
        owner: &mut O,
        args: A,
    ) -> Result<R, RttiError> {
        self.check_receiver(true)?;
        self.check_object::<O>()?;
        self.dispatch_value(Some(PtrMut::from_mut(owner)), args)
    }

    /// Calls a member method and returns its result, panicking on any
    /// mismatch.
    #[track_caller]
    pub fn invoke<O: Reflect, R: Declare, A: ArgPack>(&self, owner: &mut O, args: A) -> R {
        self.try_invoke(owner, args).unwrap_or_else(|err| fatal(err))
    }

    /// Calls a `&self` method and returns its result, panicking on any
    /// mismatch.
    #[track_caller]
    pub fn invoke_const<O: Reflect, R: Declare, A: ArgPack>(&self, owner: &O, args: A) -> R {
        let result = self.check_receiver(true).and_then(|()| {
            if !self.is_const() {
                return Err(RttiError::ConstReceiver { method: self.name });
            }
            self.check_object::<O>()?;
            // SAFETY: const methods only ever borrow their receiver immutably.
            let object = unsafe { PtrConst::from_ref(owner).into_mut() };
            self.dispatch_value(Some(object), args)
        });
        result.unwrap_or_else(|err| fatal(err))
    }

    /// Calls a static method and returns its result, panicking on any
    /// mismatch.
    #[track_caller]
    pub fn invoke_static<R: Declare, A: ArgPack>(&self, args: A) -> R {
        let result = self
            .check_receiver(false)
            .and_then(|()| self.dispatch_value(None, args));
        result.unwrap_or_else(|err| fatal(err))
    }

    /// Unchecked call through the thunk. Only receiver and return-slot
    /// presence are asserted; closure adapters get the receiver prepended to
    /// their arguments.
    ///
    /// # Safety
    /// `object`, `ret` and `args` must point to values of exactly the types
    /// the method was registered with (see [`Thunk::invoke`]).
    pub unsafe fn unsafe_call(
        &self,
        object: Option<PtrMut>,
        ret: Option<PtrUninit>,
        args: &[PtrMut],
    ) {
        if let Err(err) = self.check_receiver(object.is_some()) {
            fatal(err)
        }
        match (self.returns.declaration().is_void(), ret.is_some()) {
            (true, true) => fatal(RttiError::UnexpectedReturnSlot { method: self.name }),
            (false, false) => fatal(RttiError::MissingReturnSlot { method: self.name }),
            _ => {}
        }

        if self.is_lambda() {
            let mut erased = Vec::with_capacity(args.len() + 1);
            erased.extend(object);
            erased.extend_from_slice(args);
            unsafe { self.thunk.invoke(None, ret, &erased) }
        } else {
            unsafe { self.thunk.invoke(object, ret, args) }
        }
    }
}

impl HasAttributes for Method {
    fn attributes(&self) -> &[Arc<dyn Attribute>] {
        &self.attributes
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fn {}(", self.name)?;
        let mut first = true;
        if !self.is_static() {
            f.write_str(if self.is_const() { "&self" } else { "&mut self" })?;
            first = false;
        }
        for arg in &self.arguments {
            if !first {
                f.write_str(", ")?;
            }
            write!(f, "{}: {}", arg.name(), arg.declaration())?;
            first = false;
        }
        f.write_str(")")?;
        if !self.returns.declaration().is_void() {
            write!(f, " -> {}", self.returns.declaration())?;
        }
        Ok(())
    }
}

impl fmt::Debug for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Method")
            .field("name", &self.name)
            .field("flags", &self.flags)
            .field("returns", self.returns.declaration())
            .field("arguments", &self.arguments)
            .finish()
    }
}
