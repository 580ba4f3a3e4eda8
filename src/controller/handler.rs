use crate::context::{IntoReply, Reply};
use crate::di::{Injector, Instance};
use crate::error::{Error, Result};
use futures::future::BoxFuture;
use std::any::TypeId;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

/// A declared parameter type of a controller method
///
/// Derived from the handler signature; every parameter is resolved from the
/// request injector before the method is invoked.
#[derive(Clone, Copy)]
pub struct ParamType {
    type_id: TypeId,
    name: &'static str,
    resolve: fn(&Injector) -> BoxFuture<'_, Result<Instance>>,
}

impl ParamType {
    pub fn of<P: Send + Sync + 'static>() -> Self {
        Self {
            type_id: TypeId::of::<P>(),
            name: std::any::type_name::<P>(),
            resolve: resolve_param::<P>,
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Resolve this parameter for the current request
    pub fn resolve<'a>(&self, injector: &'a Injector) -> BoxFuture<'a, Result<Instance>> {
        (self.resolve)(injector)
    }
}

impl PartialEq for ParamType {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for ParamType {}

impl std::fmt::Debug for ParamType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name)
    }
}

fn resolve_param<P: Send + Sync + 'static>(injector: &Injector) -> BoxFuture<'_, Result<Instance>> {
    Box::pin(async move { Ok(injector.get_instance::<P>().await? as Instance) })
}

fn downcast_arg<P: Send + Sync + 'static>(arg: Option<Instance>) -> Result<Arc<P>> {
    arg.ok_or_else(|| {
        Error::Internal(format!(
            "argument {} was not resolved",
            std::any::type_name::<P>()
        ))
    })?
    .downcast::<P>()
    .map_err(|_| Error::downcast_failed::<P>())
}

/// A controller method usable as a route handler
///
/// Implemented for functions taking the controller as `Arc<C>` followed by
/// up to eight `Arc<P>` parameters, returning a future whose output
/// implements [`IntoReply`]. `async fn name(self: Arc<Self>, ...)` methods
/// qualify directly.
pub trait MethodHandler<C, Args>: Send + Sync + 'static {
    /// Declared parameter types, in order
    fn params() -> Vec<ParamType>;

    /// Call the method with already resolved arguments
    fn invoke(&self, instance: Arc<C>, args: Vec<Instance>) -> BoxFuture<'static, Result<Option<Reply>>>;
}

macro_rules! impl_method_handler {
    ($($P:ident),*) => {
        #[allow(non_snake_case, unused_mut, unused_variables)]
        impl<C, F, Fut, R, $($P,)*> MethodHandler<C, ($($P,)*)> for F
        where
            C: Send + Sync + 'static,
            F: Fn(Arc<C>, $(Arc<$P>,)*) -> Fut + Send + Sync + 'static,
            Fut: Future<Output = R> + Send + 'static,
            R: IntoReply,
            $($P: Send + Sync + 'static,)*
        {
            fn params() -> Vec<ParamType> {
                vec![$(ParamType::of::<$P>(),)*]
            }

            fn invoke(&self, instance: Arc<C>, args: Vec<Instance>) -> BoxFuture<'static, Result<Option<Reply>>> {
                let mut args = args.into_iter();
                $(
                    let $P = match downcast_arg::<$P>(args.next()) {
                        Ok(arg) => arg,
                        Err(e) => return Box::pin(async move { Err(e) }),
                    };
                )*
                let future = self(instance, $($P,)*);
                Box::pin(async move { future.await.into_reply() })
            }
        }
    };
}

impl_method_handler!();
impl_method_handler!(P1);
impl_method_handler!(P1, P2);
impl_method_handler!(P1, P2, P3);
impl_method_handler!(P1, P2, P3, P4);
impl_method_handler!(P1, P2, P3, P4, P5);
impl_method_handler!(P1, P2, P3, P4, P5, P6);
impl_method_handler!(P1, P2, P3, P4, P5, P6, P7);
impl_method_handler!(P1, P2, P3, P4, P5, P6, P7, P8);

trait ErasedHandler<C>: Send + Sync {
    fn invoke(&self, instance: Arc<C>, args: Vec<Instance>) -> BoxFuture<'static, Result<Option<Reply>>>;
}

struct HandlerFn<H, Args> {
    handler: H,
    _args: PhantomData<fn() -> Args>,
}

impl<C, H, Args> ErasedHandler<C> for HandlerFn<H, Args>
where
    H: MethodHandler<C, Args>,
    Args: 'static,
{
    fn invoke(&self, instance: Arc<C>, args: Vec<Instance>) -> BoxFuture<'static, Result<Option<Reply>>> {
        self.handler.invoke(instance, args)
    }
}

/// Type-erased reference to the original controller method
pub struct MethodHandle<C> {
    inner: Arc<dyn ErasedHandler<C>>,
}

impl<C: 'static> MethodHandle<C> {
    pub fn new<H, Args>(handler: H) -> Self
    where
        H: MethodHandler<C, Args>,
        Args: 'static,
    {
        Self {
            inner: Arc::new(HandlerFn {
                handler,
                _args: PhantomData,
            }),
        }
    }

    pub fn invoke(&self, instance: Arc<C>, args: Vec<Instance>) -> BoxFuture<'static, Result<Option<Reply>>> {
        self.inner.invoke(instance, args)
    }
}

impl<C> Clone for MethodHandle<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}
