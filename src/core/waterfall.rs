use super::types::{Bar, BarType, BarValue, Node, NodeKind};

pub fn decomposition_to_waterfall<V: BarValue>(root: &Node<V>) -> Vec<Bar<V>> {
    let mut base = None;
    let mut bars = Vec::new();
    if let Some(bar) = process_node(root, &mut base) {
        splice(bar, &mut bars);
    }
    bars
}

// `base` is the running offset for the whole flatten call; it is created from
// the first surviving leaf so the vector variant inherits that leaf's length.
fn process_node<V: BarValue>(node: &Node<V>, base: &mut Option<V>) -> Option<Bar<V>> {
    match &node.kind {
        NodeKind::Internal(children) => {
            let bars: Vec<Bar<V>> = children
                .iter()
                .filter_map(|child| process_node(child, base))
                .collect();
            let first = bars.first()?;
            let group_base = first.base.clone();
            let mut value = first.value.clone();
            for bar in &bars[1..] {
                value = value.plus(&bar.value);
            }
            Some(Bar {
                code: node.code.clone(),
                name: node.name.clone(),
                short_name: node.short_name.clone(),
                bar_type: BarType::SubTotal,
                base: group_base,
                value,
                children: bars,
            })
        }
        NodeKind::Leaf(value) => {
            if value.is_zero() {
                return None;
            }
            let current = base.get_or_insert_with(|| value.zero_like());
            let bar = Bar {
                code: node.code.clone(),
                name: node.name.clone(),
                short_name: node.short_name.clone(),
                bar_type: BarType::Value,
                base: current.clone(),
                value: value.clone(),
                children: Vec::new(),
            };
            *current = current.plus(value);
            Some(bar)
        }
    }
}

fn splice<V: BarValue>(bar: Bar<V>, out: &mut Vec<Bar<V>>) {
    for child in bar.children.clone() {
        splice(child, out);
    }
    out.push(bar);
}

pub fn select_index(node: &Node<Vec<f64>>, index: usize) -> Node<f64> {
    let kind = match &node.kind {
        NodeKind::Internal(children) => NodeKind::Internal(
            children
                .iter()
                .map(|child| select_index(child, index))
                .collect(),
        ),
        NodeKind::Leaf(values) => NodeKind::Leaf(values.get(index).copied().unwrap_or(0.0)),
    };
    Node {
        code: node.code.clone(),
        name: node.name.clone(),
        short_name: node.short_name.clone(),
        kind,
    }
}

pub fn project_bars(bars: &[Bar<Vec<f64>>], index: usize) -> Vec<Bar<f64>> {
    bars.iter()
        .map(|bar| project_bar(bar, index))
        .filter(|bar| bar.value != 0.0)
        .collect()
}

fn project_bar(bar: &Bar<Vec<f64>>, index: usize) -> Bar<f64> {
    Bar {
        code: bar.code.clone(),
        name: bar.name.clone(),
        short_name: bar.short_name.clone(),
        bar_type: bar.bar_type,
        base: bar.base.get(index).copied().unwrap_or(0.0),
        value: bar.value.get(index).copied().unwrap_or(0.0),
        children: bar
            .children
            .iter()
            .map(|child| project_bar(child, index))
            .collect(),
    }
}

pub fn visible_bars<V: BarValue>(
    bars: &[Bar<V>],
    show_sub_totals: bool,
    total_code: &str,
) -> Vec<Bar<V>> {
    bars.iter()
        .filter(|bar| {
            bar.code == total_code || show_sub_totals || bar.bar_type != BarType::SubTotal
        })
        .cloned()
        .collect()
}
