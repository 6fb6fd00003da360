use anyhow::Result;
use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use QuiverBloom::lock::lock_file_path;
use QuiverBloom::{BloomConfig, HashKind, PersistentFilter};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

fn unique_root(prefix: &str) -> PathBuf {
    let pid = std::process::id();
    let t = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
    let root = std::env::temp_dir().join(format!("qbtest-{prefix}-{pid}-{t}-{id}"));
    fs::create_dir_all(&root).unwrap();
    root
}

/// Создание: файл ровно ceil(m/8) байт, заполнен нулями.
#[test]
fn create_zero_fills_exact_length() -> Result<()> {
    let root = unique_root("create");

    for (m, want) in [(32u32, 4u64), (0, 1), (1, 1), (9, 2), (32000, 4000)] {
        let path = root.join(format!("f{m}.bloom"));
        {
            let f = PersistentFilter::open(&path, m)?;
            assert_eq!(f.byte_len() as u64, want);
            assert_eq!(f.bit_len(), m.max(1));
            assert_eq!(f.count_ones(), 0);
        }
        let bytes = fs::read(&path)?;
        assert_eq!(bytes.len() as u64, want, "file length for m={m}");
        assert!(bytes.iter().all(|&b| b == 0));
    }

    fs::remove_dir_all(&root)?;
    Ok(())
}

/// Round-trip: alpha/beta переживают закрытие и повторное открытие с тем же m.
#[test]
fn persistence_roundtrip() -> Result<()> {
    let root = unique_root("roundtrip");
    let path = root.join("bloom.bin");

    {
        let mut f = PersistentFilter::open(&path, 256)?;
        f.add(b"alpha");
        f.add(b"beta");
        assert!(f.check(b"alpha"));
        // drop → flush
    }

    let f = PersistentFilter::open(&path, 256)?;
    assert!(f.check(b"alpha"));
    assert!(f.check(b"beta"));
    assert_eq!(fs::metadata(&path)?.len(), 32);

    drop(f);
    fs::remove_dir_all(&root)?;
    Ok(())
}

/// Контролируемый сценарий отсутствия: m=32000, один ключ, случайный 16-байтовый probe.
/// Вероятностный, не абсолютный.
#[test]
fn sparse_persistent_filter_reports_absent() -> Result<()> {
    let root = unique_root("sparse");
    let path = root.join("bloom.bin");
    {
        let mut f = PersistentFilter::open(&path, 32000)?;
        f.add(b"alpha");
    }
    let f = PersistentFilter::open(&path, 32000)?;
    let mut rng = oorandom::Rand64::new(0xFEED_BEEF);
    let mut probe = [0u8; 16];
    for chunk in probe.chunks_mut(8) {
        chunk.copy_from_slice(&rng.rand_u64().to_le_bytes());
    }
    assert!(f.check(b"alpha"));
    assert!(!f.check(&probe));

    drop(f);
    fs::remove_dir_all(&root)?;
    Ok(())
}

/// Биты в файле совпадают с in-memory фильтром на тех же m и хэшах.
#[test]
fn file_bytes_match_in_memory_filter() -> Result<()> {
    let root = unique_root("same-bits");
    let path = root.join("bloom.bin");

    let mut mem = QuiverBloom::BloomFilter::new(1000);
    {
        let mut f = PersistentFilter::open(&path, 1000)?;
        for i in 0..200u32 {
            let k = format!("key-{i}");
            f.add(k.as_bytes());
            mem.add(k.as_bytes());
        }
        f.flush()?;
        assert_eq!(f.as_bytes(), mem.as_bytes());
        assert_eq!(f.to_memory().as_bytes(), mem.as_bytes());
    }
    assert_eq!(fs::read(&path)?, mem.as_bytes());

    fs::remove_dir_all(&root)?;
    Ok(())
}

/// Много ключей в m=32000: ни одного ложного отрицания.
#[test]
fn mmap_add_check_many() -> Result<()> {
    let root = unique_root("many");
    let path = root.join("bloom.bin");
    let mut f = PersistentFilter::open(&path, 32000)?;
    for i in 0..32000u32 {
        let k = i.to_le_bytes();
        f.add(&k);
        assert!(f.check(&k), "key {i} not found");
    }
    drop(f);
    fs::remove_dir_all(&root)?;
    Ok(())
}

/// Несуществующая директория → Err, файла нет.
#[test]
fn missing_directory_fails() {
    let root = unique_root("nodir");
    let path = root.join("no/such/dir/bloom.bin");
    let res = PersistentFilter::open(&path, 64);
    assert!(res.is_err(), "open in a missing directory must fail");
    assert!(!path.exists());
    let _ = fs::remove_dir_all(&root);
}

/// Существующий файл короче нужного → Err (не индексируем за границу).
#[test]
fn short_existing_file_is_rejected() -> Result<()> {
    let root = unique_root("short");
    let path = root.join("bloom.bin");
    fs::write(&path, [0u8; 2])?;

    let err = PersistentFilter::open(&path, 256).unwrap_err();
    assert!(format!("{err:#}").contains("need 32 B"), "{err:#}");

    // пустой файл тоже короче 1 байта
    let empty = root.join("empty.bin");
    fs::write(&empty, b"")?;
    assert!(PersistentFilter::open(&empty, 0).is_err());

    fs::remove_dir_all(&root)?;
    Ok(())
}

/// Файл длиннее нужного принимается; биты живут в первых ceil(m/8) байтах.
#[test]
fn longer_existing_file_is_accepted() -> Result<()> {
    let root = unique_root("long");
    let path = root.join("bloom.bin");
    fs::write(&path, [0u8; 64])?;
    {
        let mut f = PersistentFilter::open(&path, 8)?;
        assert_eq!(f.byte_len(), 1);
        assert_eq!(f.as_bytes().len(), 1);
        f.add(b"x");
        assert!(f.check(b"x"));
    }
    let bytes = fs::read(&path)?;
    assert_eq!(bytes.len(), 64);
    assert_ne!(bytes[0], 0);
    assert!(bytes[1..].iter().all(|&b| b == 0));

    fs::remove_dir_all(&root)?;
    Ok(())
}

/// create(): ошибка, если файл уже есть.
#[test]
fn create_refuses_existing_file() -> Result<()> {
    let root = unique_root("create-new");
    let path = root.join("bloom.bin");
    let cfg = BloomConfig::default().with_bits(64);
    drop(PersistentFilter::create(&path, &cfg)?);
    assert!(PersistentFilter::create(&path, &cfg).is_err());
    fs::remove_dir_all(&root)?;
    Ok(())
}

/// create() под writer lock: чужой файл не подхватывается и не меняется, lock отпущен.
#[test]
fn create_under_lock_rejects_existing_file() -> Result<()> {
    let root = unique_root("create-locked");
    let path = root.join("bloom.bin");
    fs::write(&path, [0xAAu8; 8])?;

    let cfg = BloomConfig::default()
        .with_bits(64)
        .with_lock(true)
        .with_lock_wait(false);
    let err = PersistentFilter::create(&path, &cfg).unwrap_err();
    assert!(format!("{err:#}").contains("already exists"), "{err:#}");
    assert_eq!(fs::read(&path)?, vec![0xAAu8; 8]);

    // lock снят вместе с ошибкой
    let f = PersistentFilter::open_with_config(&path, &cfg)?;
    assert!(f.is_locked());
    drop(f);

    fs::remove_dir_all(&root)?;
    Ok(())
}

/// Хэши из конфига; тот же список нужен при reopen.
#[test]
fn config_hashes_apply_to_persistent() -> Result<()> {
    let root = unique_root("hashes");
    let path = root.join("bloom.bin");
    let cfg = BloomConfig::default()
        .with_bits(4096)
        .with_hashes(&[HashKind::Xx32Seed0, HashKind::Murmur3_32, HashKind::Fnv1_32]);
    {
        let mut f = PersistentFilter::open_with_config(&path, &cfg)?;
        assert_eq!(f.hash_kinds().len(), 3);
        f.add(b"gamma");
        assert!(f.count_ones() <= 3);
    }
    let f = PersistentFilter::open_with_config(&path, &cfg)?;
    assert!(f.check(b"gamma"));
    drop(f);
    fs::remove_dir_all(&root)?;
    Ok(())
}

/// Writer lock: второй non-blocking open на тот же файл получает Err, пока первый жив.
#[test]
fn writer_lock_excludes_second_writer() -> Result<()> {
    let root = unique_root("lock");
    let path = root.join("bloom.bin");
    let cfg = BloomConfig::default()
        .with_bits(128)
        .with_lock(true)
        .with_lock_wait(false);

    let first = PersistentFilter::open_with_config(&path, &cfg)?;
    assert!(first.is_locked());
    assert!(lock_file_path(&path).exists());
    assert_eq!(first.lock_path(), Some(lock_file_path(&path).as_path()));
    assert!(
        PersistentFilter::open_with_config(&path, &cfg).is_err(),
        "second locked writer must fail while the first holds the lock"
    );

    // без lock открыть можно (advisory)
    let unlocked = PersistentFilter::open(&path, 128)?;
    assert!(!unlocked.is_locked());
    assert!(unlocked.lock_path().is_none());
    drop(unlocked);

    drop(first);
    let again = PersistentFilter::open_with_config(&path, &cfg)?;
    assert!(again.is_locked());
    drop(again);

    fs::remove_dir_all(&root)?;
    Ok(())
}

/// Blocking lock (lock_wait=true): второй writer ждёт, пока первый не будет dropped.
#[test]
fn blocking_writer_lock_waits_for_release() -> Result<()> {
    let root = unique_root("lock-wait");
    let path = root.join("bloom.bin");
    let cfg = BloomConfig::default().with_bits(128).with_lock(true);
    assert!(cfg.lock_wait);

    let mut first = PersistentFilter::open_with_config(&path, &cfg)?;
    first.add(b"first");
    let acquired = AtomicBool::new(false);

    thread::scope(|s| -> Result<()> {
        let waiter = s.spawn(|| -> Result<bool> {
            let second = PersistentFilter::open_with_config(&path, &cfg)?;
            acquired.store(true, Ordering::SeqCst);
            Ok(second.is_locked() && second.check(b"first"))
        });

        thread::sleep(Duration::from_millis(200));
        assert!(
            !acquired.load(Ordering::SeqCst),
            "second writer must wait while the first holds the lock"
        );

        drop(first);
        let ok = waiter.join().expect("waiter thread panicked")?;
        assert!(ok);
        Ok(())
    })?;
    assert!(acquired.load(Ordering::SeqCst));

    fs::remove_dir_all(&root)?;
    Ok(())
}

/// Два отображения одного файла в одном процессе видят записи друг друга.
#[test]
fn shared_mapping_sees_writes() -> Result<()> {
    let root = unique_root("shared");
    let path = root.join("bloom.bin");
    let mut a = PersistentFilter::open(&path, 2048)?;
    let b = PersistentFilter::open(&path, 2048)?;
    a.add(b"visible");
    assert!(b.check(b"visible"));
    drop(a);
    drop(b);
    fs::remove_dir_all(&root)?;
    Ok(())
}

/// flush_on_drop=false: явный flush всё равно сохраняет биты.
#[test]
fn explicit_flush_without_flush_on_drop() -> Result<()> {
    let root = unique_root("flush");
    let path = root.join("bloom.bin");
    let cfg = BloomConfig::default().with_bits(256).with_flush_on_drop(false);
    {
        let mut f = PersistentFilter::open_with_config(&path, &cfg)?;
        f.add(b"alpha");
        f.flush_async()?;
        f.flush()?;
    }
    let f = PersistentFilter::open_with_config(&path, &cfg)?;
    assert!(f.check(b"alpha"));
    drop(f);
    fs::remove_dir_all(&root)?;
    Ok(())
}
