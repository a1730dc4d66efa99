use proptest::prelude::*;
use socflow::*;
use socflow_std::csr::*;
use socflow_std::wishbone::*;
use socflow_std::ConfigError;

fn bridge(csr_width: u32, wb_width: u32) -> WishboneCsrBridge {
    WishboneCsrBridge::new(CsrInterface::new(16, csr_width).unwrap(), Some(wb_width)).unwrap()
}

/// Register bank: every register holds its last written value.
fn bank(init: Vec<Bits>) -> impl Fsm<I = ElementBus, O = (), S = Vec<Bits>> {
    FnFsm::<ElementBus, (), _, _>::new(
        "bank",
        |drives: &Vec<ElementDrive>, _: &(), regs: &Vec<Bits>| {
            let next = regs
                .iter()
                .zip(drives)
                .map(|(reg, drive)| if drive.w_stb { drive.w_data.clone() } else { reg.clone() })
                .collect::<Vec<_>>();
            ((), regs.clone(), next)
        },
        init,
    )
}

/// Steps `sim` with `req` until `ack`. Returns the number of cycles before `ack`, and the response.
fn transaction<M: Fsm<I = WishboneBus>>(
    sim: &mut Simulator<M>, req: &WishboneRequest, o_bwd: &Bwd<M::O>,
) -> (usize, WishboneResponse) {
    for cycles in 0..16 {
        let (_, resp) = sim.step(req, o_bwd);
        if resp.ack {
            return (cycles, resp);
        }
    }
    panic!("transaction not acknowledged");
}

#[test]
fn addr_width() {
    let narrow = WishboneCsrBridge::new(CsrInterface::new(16, 8).unwrap(), None).unwrap();
    assert_eq!(narrow.wb_bus().addr_width(), 16);
    assert_eq!(narrow.wb_bus().data_width(), 8);
    assert_eq!(narrow.chunks(), 1);

    let wide = bridge(8, 32);
    assert_eq!(wide.wb_bus().addr_width(), 14);
    assert_eq!(wide.wb_bus().granularity(), 8);
    assert_eq!(wide.wb_bus().sel_width(), 4);
    assert_eq!(wide.chunks(), 4);

    let tiny = WishboneCsrBridge::new(CsrInterface::new(1, 8).unwrap(), Some(64)).unwrap();
    assert_eq!(tiny.wb_bus().addr_width(), 0);
}

#[test]
fn wrong_widths() {
    let err = WishboneCsrBridge::new(CsrInterface::new(16, 7).unwrap(), None).unwrap_err();
    assert_eq!(err, ConfigError::UnsupportedWidth { what: "CSR bus data width", width: 7 });
    assert_eq!(err.to_string(), "CSR bus data width must be one of 8, 16, 32, 64, not 7");

    let err = WishboneCsrBridge::new(CsrInterface::new(16, 8).unwrap(), Some(24)).unwrap_err();
    assert_eq!(err, ConfigError::UnsupportedWidth { what: "Data width", width: 24 });

    let err = WishboneCsrBridge::new(CsrInterface::new(16, 32).unwrap(), Some(16)).unwrap_err();
    assert_eq!(err, ConfigError::Granularity { granularity: 32, data_width: 16 });
}

#[test]
fn pipelined_layout() {
    assert!(!bridge(8, 32).wb_bus().has(OptionalSignal::Stall));
    let bridge = bridge(8, 32).pipelined();
    assert!(bridge.wb_bus().has(OptionalSignal::Stall));
    let PortDecls::Struct(ports) = bridge.wb_bus().layout() else { panic!("layout is a struct") };
    assert_eq!(ports.last(), Some(&(Some("stall".to_string()), PortDecls::Bits(1))));
}

#[test]
fn stall_until_ack() {
    let bridge = bridge(8, 16).pipelined();
    let req = bridge.wb_bus().read(0, 0b11);
    let mut sim = Simulator::new(bridge);
    let csr = CsrResponse { r_data: Bits::from_u64(8, 0x5a) };

    let mut stalls = Vec::new();
    loop {
        let (_, resp) = sim.step(&req, &csr);
        stalls.push(resp.stall);
        if resp.ack {
            break;
        }
    }
    assert_eq!(stalls, [true, true, true, false]);
}

#[test]
fn strobe_for_one_cycle() {
    let bridge = bridge(8, 32).pipelined();
    let wb = bridge.wb_bus().clone();
    let chunks = bridge.chunks();
    let mut builder = MultiplexerBuilder::new(bridge.csr_bus(), 2).unwrap();
    builder.add(Element::new(32, Access::R)).unwrap();
    let mut sim = Simulator::new(bridge.compose("wb_csr_mux", builder.build()));
    let r_data = vec![Bits::from_u64(32, 0xdead_beef)];

    // `stb` is only asserted in the first cycle; `cyc` holds the transaction.
    let req = wb.read(0, 0b1111);
    let held = WishboneRequest { stb: false, ..req.clone() };
    let mut resps = vec![sim.step(&req, &r_data).1];
    while !resps.last().unwrap().ack {
        assert!(resps.len() <= chunks + 1, "transaction not acknowledged");
        resps.push(sim.step(&held, &r_data).1);
    }

    assert_eq!(resps.len(), chunks + 2);
    assert_eq!(resps.iter().map(|resp| resp.stall).collect::<Vec<_>>(), [true, true, true, true, true, false]);
    assert_eq!(resps.last().unwrap().dat_r.to_u64(), 0xdead_beef);

    // Without `stb`, an idle bridge does not start a new transaction.
    for _ in 0..chunks + 2 {
        let (_, resp) = sim.step(&held, &r_data);
        assert!(!resp.ack);
    }
    assert_eq!(sim.state().0.cycle(), 0);
}

#[test]
fn no_stall_without_signal() {
    let bridge = bridge(8, 16);
    let req = bridge.wb_bus().read(0, 0b11);
    let mut sim = Simulator::new(bridge);
    let csr = CsrResponse { r_data: Bits::zero(8) };
    for _ in 0..4 {
        assert!(!sim.step(&req, &csr).1.stall);
    }
}

#[test]
fn sel_skips_chunks() {
    let bridge = bridge(8, 32);
    let req = bridge.wb_bus().read(3, 0b0101);
    let mut sim = Simulator::new(bridge);
    let csr = CsrResponse { r_data: Bits::zero(8) };

    let mut r_stbs = Vec::new();
    for chunk in 0..4 {
        let (csr_req, _) = sim.step(&req, &csr);
        assert_eq!(csr_req.addr.to_u64(), (3 << 2) | chunk);
        assert!(!csr_req.w_stb);
        r_stbs.push(csr_req.r_stb);
    }
    assert_eq!(r_stbs, [true, false, true, false]);
}

#[test]
fn read_through_multiplexer() {
    let bridge = bridge(8, 32);
    let wb = bridge.wb_bus().clone();
    let mut builder = MultiplexerBuilder::new(bridge.csr_bus(), 2).unwrap();
    builder.add(Element::new(32, Access::RW).with_name("scratch")).unwrap();
    let id = builder.add(Element::new(16, Access::R).with_name("id")).unwrap();
    assert_eq!(id.addr, 4);
    let mut sim = Simulator::new(bridge.compose("wb_csr_mux", builder.build()));

    let r_data = vec![Bits::zero(32), Bits::from_u64(16, 0x1234)];
    let req = wb.read(1, 0b1111);

    let (elems, resp) = sim.step(&req, &r_data);
    assert!(elems[id.id.index()].r_stb);
    assert!(!resp.ack);
    for _ in 0..4 {
        let (elems, resp) = sim.step(&req, &r_data);
        assert!(!elems[id.id.index()].r_stb);
        assert!(!resp.ack);
    }
    let (_, resp) = sim.step(&req, &r_data);
    assert!(resp.ack);
    assert_eq!(resp.dat_r.to_u64(), 0x1234);

    let (_, resp) = sim.step(&wb.idle(), &r_data);
    assert!(!resp.ack);
    assert_eq!(sim.state().0.cycle(), 0);
    assert!(!sim.state().0.ack());
}

#[test]
fn write_through_multiplexer() {
    let bridge = bridge(8, 32);
    let wb = bridge.wb_bus().clone();
    let mut builder = MultiplexerBuilder::new(bridge.csr_bus(), 2).unwrap();
    let scratch = builder.add(Element::new(32, Access::RW)).unwrap().id.index();
    let mut sim = Simulator::new(bridge.compose("wb_csr_mux", builder.build()));

    let r_data = vec![Bits::zero(32)];
    let req = wb.write(0, 0xdead_beef, 0b1111);

    let mut w_stbs = Vec::new();
    loop {
        let (elems, resp) = sim.step(&req, &r_data);
        w_stbs.push(elems[scratch].w_stb);
        if elems[scratch].w_stb {
            assert_eq!(elems[scratch].w_data.to_u64(), 0xdead_beef);
        }
        if resp.ack {
            break;
        }
    }
    assert_eq!(w_stbs, [false, false, false, false, true, false]);
}

#[test]
fn write_then_read_back() {
    let bridge = bridge(16, 32);
    let wb = bridge.wb_bus().clone();
    let mut builder = MultiplexerBuilder::new(bridge.csr_bus(), 1).unwrap();
    builder.add(Element::new(32, Access::RW)).unwrap();
    builder.add(Element::new(24, Access::RW)).unwrap();
    let mux = builder.build();
    let init = mux.idle_r_data();
    let mut sim = Simulator::new(bridge.compose("wb_csr_mux", mux).compose("soc", bank(init)));

    assert_eq!(transaction(&mut sim, &wb.write(1, 0x00ab_cdef, 0b11), &()).0, 3);
    sim.step(&wb.idle(), &());
    assert_eq!(transaction(&mut sim, &wb.write(0, 0x1234_5678, 0b11), &()).0, 3);
    sim.step(&wb.idle(), &());

    let (_, resp) = transaction(&mut sim, &wb.read(1, 0b11), &());
    assert_eq!(resp.dat_r.to_u64(), 0x00ab_cdef);
    sim.step(&wb.idle(), &());
    let (_, resp) = transaction(&mut sim, &wb.read(0, 0b11), &());
    assert_eq!(resp.dat_r.to_u64(), 0x1234_5678);
    assert_eq!(sim.state().1[0].to_u64(), 0x1234_5678);
}

proptest! {
    #[test]
    fn pacing(
        csr_width in prop_oneof![Just(8u32), Just(16), Just(32)],
        sel in 0u64..16,
        we in any::<bool>(),
        adr in 0u64..4,
        data in any::<u32>(),
    ) {
        let bridge = bridge(csr_width, 32);
        let chunks = bridge.chunks();
        let wb = bridge.wb_bus().clone();
        let mut builder = MultiplexerBuilder::new(bridge.csr_bus(), flog2(chunks) as u32).unwrap();
        for _ in 0..4 {
            builder.add(Element::new(32, Access::RW)).unwrap();
        }
        let mux = builder.build();
        let r_data = mux.idle_r_data();
        let mut sim = Simulator::new(bridge.compose("wb_csr_mux", mux));

        let req = if we { wb.write(adr, u64::from(data), sel) } else { wb.read(adr, sel) };
        let (cycles, _) = transaction(&mut sim, &req, &r_data);
        prop_assert_eq!(cycles, chunks + 1);

        let (_, resp) = sim.step(&wb.idle(), &r_data);
        prop_assert!(!resp.ack);
        prop_assert_eq!(sim.state().0.cycle(), 0);
        prop_assert!(!sim.state().0.ack());
    }
}
