//! End-to-end broadcast and dispatch through the public surface.

use core::cell::{Cell, RefCell};
use core::ffi::c_void;

use vmbridge::{
    AddressResolver, CallbackHandle, Dispatcher, EventBroadcaster, EventRegistry, FixedString,
    HostVariant, ObjectHandle, RawVm, ScrapArray, Subscriber, Variable, VmContext,
};

struct RecordingVm {
    accept: Cell<bool>,
    dispatched: RefCell<Vec<(ObjectHandle, String, String, Vec<Variable>)>>,
}

impl RecordingVm {
    fn new() -> Self {
        Self {
            accept: Cell::new(true),
            dispatched: RefCell::new(Vec::new()),
        }
    }
}

impl VmContext for RecordingVm {
    fn dispatch_static_call(
        &self,
        script: FixedString,
        func: FixedString,
        supply: &mut dyn FnMut(&mut ScrapArray) -> bool,
        _done: Option<CallbackHandle>,
    ) -> bool {
        let mut args = ScrapArray::new();
        assert!(supply(&mut args));
        self.dispatched.borrow_mut().push((
            ObjectHandle(0),
            script.as_str().to_owned(),
            func.as_str().to_owned(),
            args.as_slice().to_vec(),
        ));
        self.accept.get()
    }

    fn dispatch_method_call(
        &self,
        receiver: ObjectHandle,
        script: FixedString,
        func: FixedString,
        supply: &mut dyn FnMut(&mut ScrapArray) -> bool,
        _done: Option<CallbackHandle>,
    ) -> bool {
        let mut args = ScrapArray::new();
        assert!(supply(&mut args));
        self.dispatched.borrow_mut().push((
            receiver,
            script.as_str().to_owned(),
            func.as_str().to_owned(),
            args.as_slice().to_vec(),
        ));
        self.accept.get()
    }

    fn raw(&self) -> RawVm {
        RawVm::from_ptr(self as *const Self as *mut c_void)
    }
}

struct NoResolver;

impl AddressResolver for NoResolver {
    fn resolve(&self, _id: vmbridge::host::RelocationId) -> usize {
        0
    }

    fn resolve_vtable_slot(&self, _table: vmbridge::host::VtableId, _slot: usize) -> usize {
        0
    }
}

struct FixedRegistry(Vec<(String, u64, String, String)>);

impl EventRegistry for FixedRegistry {
    fn for_each_subscriber(&self, event: &str, visit: &mut dyn FnMut(Subscriber<'_>)) {
        for (name, handle, script, callback) in &self.0 {
            if name == event {
                visit(Subscriber {
                    handle: ObjectHandle(*handle),
                    script,
                    callback,
                });
            }
        }
    }
}

fn registry(entries: &[(&str, u64, &str, &str)]) -> FixedRegistry {
    FixedRegistry(
        entries
            .iter()
            .map(|(e, h, s, c)| ((*e).to_owned(), *h, (*s).to_owned(), (*c).to_owned()))
            .collect(),
    )
}

#[test]
fn broadcast_targets_each_subscriber_with_the_same_arguments() {
    let vm = RecordingVm::new();
    let dispatcher = Dispatcher::new(&vm, &NoResolver, HostVariant::Current);
    let registry = registry(&[
        ("OnFoo", 0x10, "AlchemyScript", "OnFoo"),
        ("OnFoo", 0x20, "CombatScript", "FooHandler"),
        ("OnFoo", 0x30, "TravelScript", "ReceiveFoo"),
        ("OnQuit", 0x99, "MenuScript", "OnQuit"),
    ]);
    let broadcaster = EventBroadcaster::new(&dispatcher, &registry);

    broadcaster.broadcast("OnFoo", (1, "bar"));

    let dispatched = vm.dispatched.borrow();
    assert_eq!(dispatched.len(), 3);

    let expected_args = vec![Variable::int(1), Variable::string(FixedString::new("bar"))];
    let expected = [
        (ObjectHandle(0x10), "AlchemyScript", "OnFoo"),
        (ObjectHandle(0x20), "CombatScript", "FooHandler"),
        (ObjectHandle(0x30), "TravelScript", "ReceiveFoo"),
    ];
    for ((receiver, script, func, args), (handle, exp_script, exp_func)) in
        dispatched.iter().zip(expected)
    {
        assert_eq!(*receiver, handle);
        assert_eq!(script, exp_script);
        assert_eq!(func, exp_func);
        assert_eq!(args, &expected_args);
    }
}

#[test]
fn broadcast_without_subscribers_dispatches_nothing() {
    let vm = RecordingVm::new();
    let dispatcher = Dispatcher::new(&vm, &NoResolver, HostVariant::Current);
    let registry = registry(&[("OnOther", 1, "S", "C")]);
    let broadcaster = EventBroadcaster::new(&dispatcher, &registry);

    broadcaster.broadcast("OnFoo", (3.5f32, false));

    assert!(vm.dispatched.borrow().is_empty());
}

#[test]
fn rejecting_host_does_not_stop_the_broadcast() {
    let vm = RecordingVm::new();
    vm.accept.set(false);
    let dispatcher = Dispatcher::new(&vm, &NoResolver, HostVariant::Current);
    let registry = registry(&[
        ("OnFoo", 1, "A", "Cb"),
        ("OnFoo", 2, "B", "Cb"),
        ("OnFoo", 3, "C", "Cb"),
    ]);
    let broadcaster = EventBroadcaster::new(&dispatcher, &registry);

    broadcaster.broadcast("OnFoo", ());

    assert_eq!(vm.dispatched.borrow().len(), 3);
}

#[test]
fn static_and_method_calls_reach_the_vm_with_packed_arguments() {
    let vm = RecordingVm::new();
    let dispatcher = Dispatcher::new(&vm, &NoResolver, HostVariant::Current);

    assert!(dispatcher.call_static(
        FixedString::new("Globals"),
        FixedString::new("Notify"),
        None,
        ("hello", 2),
    ));
    assert!(dispatcher.call_method(
        ObjectHandle(0xA11CE),
        FixedString::new("PlayerScript"),
        FixedString::new("GiveItem"),
        None,
        (7, true),
    ));

    let dispatched = vm.dispatched.borrow();
    assert_eq!(dispatched.len(), 2);
    assert_eq!(
        dispatched[0].3,
        vec![
            Variable::string(FixedString::new("hello")),
            Variable::int(2)
        ]
    );
    assert_eq!(dispatched[1].0, ObjectHandle(0xA11CE));
    assert_eq!(
        dispatched[1].3,
        vec![Variable::int(7), Variable::boolean(true)]
    );
}
