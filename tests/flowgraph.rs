//! End-to-end control flow graph construction tests over raw IL streams.

use cilflow::{
    flow::build_graphs, Error, ExceptionRegion, FlowGraph, MethodBody,
};

fn build(il: &[u8], regions: Vec<ExceptionRegion>) -> FlowGraph {
    let graph = MethodBody::from_il(il, regions)
        .expect("IL should decode")
        .into_flow_graph()
        .expect("graph should build");
    assert_invariants(&graph);
    graph
}

/// Checks the structural invariants every constructed graph must satisfy.
fn assert_invariants(graph: &FlowGraph) {
    assert!(graph.block_count() > 0);

    // The first root is the method entry at the stream's first offset.
    let entry = graph.entry();
    assert_eq!(graph.roots()[0], entry);
    let first_offset = graph.instructions(entry)[0].offset;
    assert_eq!(graph.block_at(first_offset), Some(entry));

    let last_offset = graph
        .blocks()
        .flat_map(|(id, _)| graph.instructions(id))
        .map(|i| i.offset)
        .max()
        .expect("at least one instruction");

    for (id, block) in graph.blocks() {
        let instructions = graph.instructions(id);
        assert!(!instructions.is_empty(), "{id} has no instructions");
        assert_eq!(instructions[0].offset, block.offset());
        assert_eq!(graph.block_at(block.offset()), Some(id));

        // No duplicate successors.
        let successors = graph.successors(id);
        for (i, a) in successors.iter().enumerate() {
            assert!(
                !successors[i + 1..].contains(a),
                "{id} lists successor {a} twice"
            );
        }

        // Fallthrough invariant: unless the block ends the stream or closes
        // with an instruction that suppresses fallthrough, the next block in
        // offset order must be among the successors.
        let last = instructions.last().unwrap();
        if last.offset != last_offset && !last.flow_type.suppresses_fallthrough() {
            let next = graph
                .block_at(last.next_offset())
                .expect("fallthrough offset must start a block");
            assert!(
                successors.contains(&next),
                "{id} is missing its fallthrough edge"
            );
        }
    }

    // BFS from all roots yields each block at most once.
    let visited: Vec<_> = graph.bfs().collect();
    let mut deduped = visited.clone();
    deduped.sort_unstable();
    deduped.dedup();
    assert_eq!(visited.len(), deduped.len());
}

#[test]
fn linear_method_is_a_single_block() {
    let graph = build(&[0x00, 0x00, 0x2A], vec![]); // nop; nop; ret

    assert_eq!(graph.block_count(), 1);
    assert_eq!(graph.roots().len(), 1);
    assert!(graph.successors(graph.entry()).is_empty());
    assert_eq!(graph.instructions(graph.entry()).len(), 3);
}

#[test]
fn conditional_branch_produces_three_blocks() {
    // IL_0000 brtrue.s IL_000A
    // IL_0002 nop x6                (fallthrough block)
    // IL_0008 ldloc.0
    // IL_0009 ret
    // IL_000A ret                   (branch target)
    let il = [
        0x2D, 0x08, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x06, 0x2A, 0x2A,
    ];
    let graph = build(&il, vec![]);
    assert_eq!(graph.block_count(), 3);

    let b0 = graph.block_at(0).unwrap();
    let fall = graph.block_at(2).unwrap();
    let target = graph.block_at(10).unwrap();

    assert_eq!(graph.successors(b0), &[target, fall]);
    assert!(graph.successors(fall).is_empty());
    assert!(graph.successors(target).is_empty());
}

#[test]
fn switch_with_repeated_labels_yields_unique_successors() {
    // switch (L1, L2, L1); padding nops; L1: ret; L2: ret
    let il = [
        0x45, 0x03, 0x00, 0x00, 0x00, // switch, next = IL_0011
        0x04, 0x00, 0x00, 0x00, // case 0 -> IL_0015
        0x05, 0x00, 0x00, 0x00, // case 1 -> IL_0016
        0x04, 0x00, 0x00, 0x00, // case 2 -> IL_0015 again
        0x00, 0x00, 0x00, 0x00, // IL_0011 nops
        0x2A, // IL_0015 L1: ret
        0x2A, // IL_0016 L2: ret
    ];
    let graph = build(&il, vec![]);

    let b0 = graph.block_at(0).unwrap();
    let l1 = graph.block_at(0x15).unwrap();
    let l2 = graph.block_at(0x16).unwrap();
    assert_eq!(graph.successors(b0), &[l1, l2]);
}

#[test]
fn try_handler_split_without_synthesized_dispatch_edge() {
    // try [0, 20) with a handler [20, 30): linear code on both sides.
    let mut il = Vec::new();
    il.extend_from_slice(&[0x00; 18]); // IL_0000..IL_0011 nop
    il.extend_from_slice(&[0xDE, 0x0A]); // IL_0012 leave.s IL_001E
    il.extend_from_slice(&[0x00; 9]); // IL_0014..IL_001C handler body
    il.push(0x2A); // IL_001D ret (last handler instruction)
    il.push(0x2A); // IL_001E ret (leave target)
    let region = ExceptionRegion::typed(0, 20, 20, 30).unwrap();
    let graph = build(&il, vec![region]);

    let entry = graph.block_at(0).unwrap();
    let handler = graph.block_at(20).unwrap();
    assert_eq!(graph.roots(), &[entry, handler]);

    // The protected block's only successor is the leave target; nothing
    // fabricates an edge into the handler.
    let after = graph.block_at(30).unwrap();
    assert_eq!(graph.successors(entry), &[after]);
    assert!(!graph.successors(entry).contains(&handler));
}

#[test]
fn dead_code_after_unconditional_branch_is_indexed() {
    // IL_0000 br.s IL_0005; IL_0002 dead: nop x3; IL_0005 ret
    let il = [0x2B, 0x03, 0x00, 0x00, 0x00, 0x2A];
    let graph = build(&il, vec![]);

    let b0 = graph.block_at(0).unwrap();
    let dead = graph.block_at(2).unwrap();
    let target = graph.block_at(5).unwrap();

    assert_eq!(graph.successors(b0), &[target]);
    // Dead block exists with its own fallthrough successor, but BFS from the
    // roots never reaches it.
    assert_eq!(graph.successors(dead), &[target]);
    let reachable: Vec<_> = graph.bfs().collect();
    assert!(!reachable.contains(&dead));
    assert_eq!(reachable.len(), 2);
}

#[test]
fn filter_region_contributes_two_roots() {
    // try [0, 3); filter decision IL_0003..IL_0005; handler [6, 7)
    let il = [
        0x00, // IL_0000 nop
        0xDE, 0x04, // IL_0001 leave.s IL_0007
        0x16, // IL_0003 ldc.i4.0       (filter decision)
        0xFE, 0x11, // IL_0004 endfilter
        0x2A, // IL_0006 ret            (handler)
        0x2A, // IL_0007 ret
    ];
    let region = ExceptionRegion::filter(0, 3, 3, 6, 7).unwrap();
    let graph = build(&il, vec![region]);

    let entry = graph.block_at(0).unwrap();
    let filter = graph.block_at(3).unwrap();
    let handler = graph.block_at(6).unwrap();
    assert_eq!(graph.roots(), &[entry, handler, filter]);

    // endfilter terminates the filter block without successors.
    assert!(graph.successors(filter).is_empty());
}

#[test]
fn loop_with_exit_round_trips_through_bfs() {
    // IL_0000 ldc.i4.0
    // IL_0001 nop              (loop head)
    // IL_0002 ldc.i4.1
    // IL_0003 blt.s IL_0001    (back edge)
    // IL_0005 ret
    let il = [0x16, 0x00, 0x17, 0x32, 0xFC, 0x2A];
    let graph = build(&il, vec![]);
    assert_eq!(graph.block_count(), 3);

    let head = graph.block_at(1).unwrap();
    let body = graph.block_at(0).unwrap();
    let exit = graph.block_at(5).unwrap();
    assert_eq!(graph.successors(body), &[head]);
    assert_eq!(graph.successors(head), &[head, exit]);

    // Concatenating reachable blocks in offset order reproduces the stream.
    let mut ids: Vec<_> = graph.bfs().collect();
    ids.sort_by_key(|&id| graph.block(id).unwrap().offset());
    let offsets: Vec<u32> = ids
        .iter()
        .flat_map(|&id| graph.instructions(id))
        .map(|i| i.offset)
        .collect();
    assert_eq!(offsets, vec![0, 1, 2, 3, 5]);
}

#[test]
fn nested_try_finally_boundaries() {
    // outer try [0, 10) finally [10, 12); inner try [2, 5) finally [5, 7)
    let il = [
        0x00, 0x00, // IL_0000 IL_0001 nop
        0x00, // IL_0002 nop            (inner try)
        0xDE, 0x02, // IL_0003 leave.s IL_0007
        0xDC, 0x00, // IL_0005 endfinally; IL_0006 nop (inner finally)
        0xDE, 0x03, // IL_0007 leave.s IL_000C
        0x00, // IL_0009 nop
        0xDC, 0x00, // IL_000A endfinally; IL_000B nop (outer finally)
        0x2A, // IL_000C ret
    ];
    let outer = ExceptionRegion::finally(0, 10, 10, 12).unwrap();
    let inner = ExceptionRegion::finally(2, 5, 5, 7).unwrap();
    let graph = build(&il, vec![outer, inner]);

    // Region-list order: entry, outer finally, inner finally.
    let entry = graph.block_at(0).unwrap();
    let outer_h = graph.block_at(10).unwrap();
    let inner_h = graph.block_at(5).unwrap();
    assert_eq!(graph.roots(), &[entry, outer_h, inner_h]);

    // Every region boundary starts a block.
    for offset in [0, 2, 5, 7, 10] {
        assert!(graph.block_at(offset).is_some(), "IL_{offset:04X}");
    }
}

#[test]
fn dangling_branch_target_aborts_construction() {
    let result = MethodBody::from_il(&[0x2B, 0x10, 0x2A], vec![])
        .unwrap()
        .into_flow_graph();
    assert_eq!(
        result.unwrap_err(),
        Error::InvalidTarget {
            offset: 0,
            target: 18
        }
    );
}

#[test]
fn region_boundary_off_instruction_aborts_construction() {
    // try start at IL_0001 falls inside the 2-byte br.s.
    let region = ExceptionRegion::typed(1, 2, 2, 3).unwrap();
    let result = MethodBody::from_il(&[0x2B, 0x00, 0x2A], vec![region])
        .unwrap()
        .into_flow_graph();
    assert!(matches!(result, Err(Error::InvalidRegion(_))));
}

#[test]
fn empty_stream_aborts_construction() {
    let result = MethodBody::from_il(&[], vec![])
        .unwrap()
        .into_flow_graph();
    assert_eq!(result.unwrap_err(), Error::Empty);
}

#[test]
fn truncated_operand_fails_at_decode() {
    assert_eq!(
        MethodBody::from_il(&[0x45, 0x02, 0x00, 0x00, 0x00, 0x01], vec![]).unwrap_err(),
        Error::OutOfBounds
    );
}

#[test]
fn batch_construction_preserves_order() {
    let bodies = vec![
        MethodBody::from_il(&[0x00, 0x2A], vec![]).unwrap(),
        MethodBody::from_il(&[0x2B, 0x7F, 0x2A], vec![]).unwrap(), // dangling target
        MethodBody::from_il(&[0x2D, 0x01, 0x2A, 0x2A], vec![]).unwrap(),
    ];

    let graphs = build_graphs(bodies);
    assert_eq!(graphs.len(), 3);
    assert_eq!(graphs[0].as_ref().map(FlowGraph::block_count), Ok(1));
    assert!(matches!(graphs[1], Err(Error::InvalidTarget { .. })));
    assert_eq!(graphs[2].as_ref().map(FlowGraph::block_count), Ok(3));
    if let Ok(graph) = &graphs[2] {
        assert_invariants(graph);
    }
}

#[test]
fn dot_export_includes_every_block() {
    let graph = build(&[0x2D, 0x01, 0x2A, 0x2A], vec![]);
    let dot = graph.to_dot(Some("Demo.Method<T>"));

    for (id, block) in graph.blocks() {
        assert!(dot.contains(&format!("B{}_{:04X}", id.index(), block.offset())));
    }
    assert!(dot.contains("Demo.Method\\<T\\>"));
}
