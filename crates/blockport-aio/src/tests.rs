//! Engine lifecycle tests through the `AioEngine` trait object.

use bytes::{Bytes, BytesMut};
use test_case::test_case;

use crate::{AioEngine, AioError, OpenFlags, ThreadedEngine};

fn boxed_engine(len: usize, flags: OpenFlags) -> (tempfile::TempDir, Box<dyn AioEngine>) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("lifecycle.img");
    std::fs::write(&path, vec![0u8; len]).unwrap();
    let engine = ThreadedEngine::open(&path, flags).unwrap();
    (dir, Box::new(engine))
}

#[test]
fn full_lifecycle_through_trait_object() {
    let (_dir, mut engine) = boxed_engine(1 << 16, OpenFlags::read_write());

    for (i, offset) in [0u64, 512, 4096, 65_000].into_iter().enumerate() {
        engine.wait().unwrap();
        let payload = Bytes::from(vec![i as u8 + 1; 100]);
        let id = engine.submit_write(payload.clone(), offset).unwrap();
        assert_eq!(engine.wait_for(id).unwrap().bytes, 100);

        engine.wait().unwrap();
        let id = engine.submit_read(BytesMut::zeroed(100), offset).unwrap();
        let done = engine.wait_for(id).unwrap();
        assert_eq!(done.data.unwrap().freeze(), payload);
    }

    engine.flush().unwrap();
    assert_eq!(engine.file_size().unwrap(), 1 << 16);
    engine.close().unwrap();
}

#[test]
fn writes_past_end_grow_the_file() {
    let (_dir, mut engine) = boxed_engine(10, OpenFlags::read_write());

    let id = engine.submit_write(Bytes::from_static(b"tail"), 20).unwrap();
    engine.wait_for(id).unwrap();
    assert_eq!(engine.file_size().unwrap(), 24);
}

#[test_case(OpenFlags::read_only(), false; "read only")]
#[test_case(OpenFlags::read_write(), true; "read write")]
#[test_case(OpenFlags::read_write().with_sync(true), true; "read write sync")]
fn write_permission_follows_open_flags(flags: OpenFlags, writable: bool) {
    let (_dir, mut engine) = boxed_engine(64, flags);

    let id = engine.submit_write(Bytes::from_static(b"data"), 0).unwrap();
    let result = engine.wait_for(id);
    assert_eq!(result.is_ok(), writable);
    if let Err(err) = result {
        assert!(matches!(err, AioError::Io { .. }));
        assert!(err.raw_os_error().is_some());
    }
}

#[test]
fn dropping_an_open_engine_releases_the_worker() {
    let (_dir, mut engine) = boxed_engine(64, OpenFlags::read_write());
    engine
        .submit_write(Bytes::from_static(b"in flight"), 0)
        .unwrap();
    drop(engine);
}
