use microconv::conv::pad;
use microconv::tensor::Blob;
use microconv::ConvError;

#[test]
fn blob_get_set() {
    let mut t = Blob::zeros(2, 3, 4);
    t.set(1, 2, 3, 42.0).unwrap();
    assert_eq!(t.get(1, 2, 3).unwrap(), 42.0);
    assert_eq!(t.len(), 24);
}

#[test]
fn blob_fill() {
    let mut t = Blob::zeros(1, 2, 2);
    t.fill(7.0);
    assert_eq!(t.get(0, 0, 0).unwrap(), 7.0);
    assert_eq!(t.get(0, 1, 1).unwrap(), 7.0);
}

#[test]
fn blob_out_of_range() {
    let t = Blob::zeros(1, 2, 2);
    match t.get(0, 0, 2) {
        Err(ConvError::IndexOutOfRange { x, shape, .. }) => {
            assert_eq!(x, 2);
            assert_eq!(shape, "1x2x2");
        }
        other => panic!("expected IndexOutOfRange, got {:?}", other),
    }
}

#[test]
fn blob_channel_views() {
    let mut t = Blob::zeros(3, 2, 2);
    t.channel_mut(1).fill(5.0);
    assert_eq!(t.channel(0), &[0.0; 4]);
    assert_eq!(t.channel(1), &[5.0; 4]);
    assert_eq!(t.get(1, 1, 0).unwrap(), 5.0);
}

#[test]
fn blob_empty() {
    let t = Blob::zeros(0, 4, 4);
    assert!(t.is_empty());
}

#[test]
fn pad_zero_is_identical_copy() {
    let t = Blob::from_vec(2, 2, 3, (0..12).map(|i| i as f32).collect()).unwrap();
    let p = pad(&t, 0);
    assert_eq!(p, t);
}

#[test]
fn pad_border_is_zero_and_interior_unchanged() {
    let (d, h, w, amount) = (2, 3, 2, 2);
    let t = Blob::from_vec(d, h, w, (1..=12).map(|i| i as f32).collect()).unwrap();
    let p = pad(&t, amount);
    assert_eq!(p.shape(), (d, h + 2 * amount, w + 2 * amount));

    for z in 0..p.d {
        for y in 0..p.h {
            for x in 0..p.w {
                let inside = (amount..amount + h).contains(&y) && (amount..amount + w).contains(&x);
                let v = p.get(z, y, x).unwrap();
                if inside {
                    assert_eq!(v, t.get(z, y - amount, x - amount).unwrap());
                } else {
                    assert_eq!(v, 0.0, "border at ({}, {}, {})", z, y, x);
                }
            }
        }
    }
}
