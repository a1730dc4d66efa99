use socflow::*;
use socflow_std::wishbone::*;
use socflow_std::ConfigError;

fn layout(ports: &[(&str, usize)]) -> PortDecls {
    PortDecls::Struct(ports.iter().map(|(name, width)| (Some(name.to_string()), PortDecls::Bits(*width))).collect())
}

#[test]
fn simple() {
    let iface = WishboneInterface::new(32, 8, None).unwrap();
    assert_eq!(iface.addr_width(), 32);
    assert_eq!(iface.data_width(), 8);
    assert_eq!(iface.granularity(), 8);
    assert_eq!(
        iface.layout(),
        layout(&[("adr", 32), ("dat_w", 8), ("dat_r", 8), ("sel", 1), ("cyc", 1), ("stb", 1), ("we", 1), ("ack", 1)])
    );
}

#[test]
fn granularity() {
    let iface = WishboneInterface::new(30, 32, Some(8)).unwrap();
    assert_eq!(iface.addr_width(), 30);
    assert_eq!(iface.data_width(), 32);
    assert_eq!(iface.granularity(), 8);
    assert_eq!(iface.sel_width(), 4);
    assert_eq!(
        iface.layout(),
        layout(&[("adr", 30), ("dat_w", 32), ("dat_r", 32), ("sel", 4), ("cyc", 1), ("stb", 1), ("we", 1), ("ack", 1)])
    );
}

#[test]
fn optional() {
    let iface = WishboneInterface::new(32, 32, None)
        .unwrap()
        .with_features(["rty", "err", "stall", "lock", "cti", "bte"])
        .unwrap();
    assert!(OptionalSignal::ALL.into_iter().all(|signal| iface.has(signal)));
    assert_eq!(
        iface.layout(),
        layout(&[
            ("adr", 32),
            ("dat_w", 32),
            ("dat_r", 32),
            ("sel", 1),
            ("cyc", 1),
            ("stb", 1),
            ("we", 1),
            ("ack", 1),
            ("err", 1),
            ("rty", 1),
            ("stall", 1),
            ("lock", 1),
            ("cti", 3),
            ("bte", 2),
        ])
    );
}

#[test]
fn zero_addr_width() {
    let iface = WishboneInterface::new(0, 8, None).unwrap();
    assert_eq!(iface.idle().adr.width(), 0);
    assert_eq!(iface.read(0x12, 1).adr.to_u64(), 0);
}

#[test]
fn wrong_addr_width() {
    let err = WishboneInterface::new(65, 8, None).unwrap_err();
    assert_eq!(err.to_string(), "Address width must be an integer between 0 and 64, not 65");
}

#[test]
fn wrong_data_width() {
    let err = WishboneInterface::new(0, 7, None).unwrap_err();
    assert_eq!(err, ConfigError::UnsupportedWidth { what: "Data width", width: 7 });
    assert_eq!(err.to_string(), "Data width must be one of 8, 16, 32, 64, not 7");
}

#[test]
fn wrong_granularity() {
    let err = WishboneInterface::new(0, 32, Some(7)).unwrap_err();
    assert_eq!(err.to_string(), "Granularity must be one of 8, 16, 32, 64, not 7");
}

#[test]
fn wrong_granularity_wide() {
    let err = WishboneInterface::new(0, 8, Some(32)).unwrap_err();
    assert_eq!(err, ConfigError::Granularity { granularity: 32, data_width: 8 });
    assert_eq!(err.to_string(), "Granularity 32 may not be greater than data width 8");
}

#[test]
fn wrong_optional() {
    let err = WishboneInterface::new(0, 8, None).unwrap().with_features(["stall", "foo", "bar"]).unwrap_err();
    assert_eq!(err.to_string(), "Optional signal(s) \"foo\", \"bar\" are not supported");
}

#[test]
fn cycle_type_encoding() {
    assert_eq!(CycleType::Classic.transl(), vec![false, false, false]);
    assert_eq!(CycleType::ConstBurst.transl(), vec![true, false, false]);
    assert_eq!(CycleType::IncrBurst.transl(), vec![false, true, false]);
    assert_eq!(CycleType::EndOfBurst.transl(), vec![true, true, true]);
    assert_eq!(CycleType::Classic.width(), 3);
}

#[test]
fn burst_type_encoding() {
    assert_eq!(BurstTypeExt::Linear.transl(), vec![false, false]);
    assert_eq!(BurstTypeExt::Wrap4.transl(), vec![true, false]);
    assert_eq!(BurstTypeExt::Wrap8.transl(), vec![false, true]);
    assert_eq!(BurstTypeExt::Wrap16.transl(), vec![true, true]);
    assert_eq!(BurstTypeExt::Wrap16.port_decls(), PortDecls::Bits(2));
}

#[test]
fn request_helpers() {
    let iface = WishboneInterface::new(30, 32, Some(8)).unwrap();
    let write = iface.write(0x10, 0xdead_beef, 0b0011);
    assert!(write.cyc && write.stb && write.we);
    assert_eq!(write.adr.to_u64(), 0x10);
    assert_eq!(write.dat_w.to_u64(), 0xdead_beef);
    assert_eq!(write.sel.to_u64(), 0b0011);
    assert_eq!(write.sel.width(), 4);

    let read = iface.read(0x10, 0b1111);
    assert!(read.cyc && read.stb && !read.we);
    assert!(read.dat_w.is_zero());

    let idle = iface.idle();
    assert!(!idle.cyc && !idle.stb);
    assert_eq!(idle.width(), 30 + 32 + 4 + 3);
    assert_eq!(
        idle.port_decls().flatten(None).into_iter().map(|(name, _)| name.unwrap()).collect::<Vec<_>>(),
        ["adr", "dat_w", "sel", "cyc", "stb", "we"]
    );
}
