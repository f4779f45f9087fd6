use fpsr::search::{inspect, SearchConfig};
use fpsr::{Generator, QuantisedSwitching, StackedModulo, ToggledModulo};

fn main() {
    let generators: Vec<Generator> = vec![
        StackedModulo::default().into(),
        ToggledModulo::default().with_final_rand(false).into(),
        QuantisedSwitching::builder().derived_timing().build().into(),
    ];
    let cfg = SearchConfig::default().with_multiplier(0.75);

    for g in &generators {
        println!("{}", g.name());
        for frame in (96..112).map(|f| f as f64 + 0.5) {
            let out = inspect(g, frame, &cfg);
            let mut line = format!(
                "  frame {:>6.1}  value {:>10.6}  changed {:<5}  hold [{:.3}, {:.3})  next {:>10.6}  progress {:.3}",
                frame,
                out.value,
                out.has_changed,
                out.last_changed_frame,
                out.next_changed_frame,
                out.next_value,
                out.hold_progress,
            );
            if let Some(streams) = out.streams {
                line.push_str(&format!(
                    "  streams ({:+.3}, {:+.3}) {:?}",
                    streams.stream1, streams.stream2, streams.active
                ));
            }
            println!("{}", line);
        }
    }
}
